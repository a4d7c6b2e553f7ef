//! Schema command - print the accepted export columns and the output format

use crate::freetrade::FreetradeRecord;
use crate::model::BrokerTransaction;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// What to print
    #[arg(value_enum, default_value = "columns")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// CSV header row accepted from Freetrade
    Columns,
    /// Freetrade column descriptions
    Fields,
    /// JSON Schema of the normalised transactions
    JsonSchema,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Columns => self.print_columns(),
            SchemaFormat::Fields => self.print_fields(),
            SchemaFormat::JsonSchema => self.print_json_schema(),
        }
    }

    fn print_columns(&self) -> anyhow::Result<()> {
        println!("{}", header_line());
        Ok(())
    }

    fn print_fields(&self) -> anyhow::Result<()> {
        println!("Freetrade Export Columns");
        println!("========================");
        println!();
        for column in FreetradeRecord::columns() {
            println!("{:36}  {}", column.name, column.description);
        }
        println!();
        println!("Amounts are converted to GBP with FX Rate (orders) or Base FX Rate (dividends)");
        Ok(())
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(Vec<BrokerTransaction>);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

fn header_line() -> String {
    FreetradeRecord::columns()
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(",")
}
