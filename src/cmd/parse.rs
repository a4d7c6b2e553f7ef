//! Parse command - normalise a Freetrade export and print the transactions

use crate::freetrade::{read_freetrade_transactions, SplitTable};
use crate::model::BrokerTransaction;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ParseCommand {
    /// Freetrade activity export (CSV)
    file: PathBuf,

    /// Extra stock splits to apply (CSV with symbol,date,factor)
    #[arg(short, long)]
    splits: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl ParseCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut splits = SplitTable::builtin();
        if let Some(path) = &self.splits {
            splits.extend(SplitTable::read_csv(File::open(path)?)?);
        }

        let transactions = read_freetrade_transactions(&self.file, &splits)?;

        match self.format {
            OutputFormat::Table => {
                print_table(&transactions);
                Ok(())
            }
            OutputFormat::Csv => write_csv(&transactions, io::stdout()),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&transactions)?);
                Ok(())
            }
        }
    }
}

/// Row for the transactions table output
#[derive(Debug, Clone, Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&BrokerTransaction> for TransactionRow {
    fn from(tx: &BrokerTransaction) -> Self {
        TransactionRow {
            date: tx.date.format("%Y-%m-%d").to_string(),
            action: tx.action.to_string(),
            symbol: tx.symbol.clone().unwrap_or_default(),
            quantity: tx.quantity.map(format_quantity).unwrap_or_default(),
            price: tx.price.map(format_gbp).unwrap_or_default(),
            amount: format_gbp(tx.amount),
            description: tx.description.clone(),
        }
    }
}

fn print_table(transactions: &[BrokerTransaction]) {
    if transactions.is_empty() {
        println!("No transactions found");
        return;
    }

    let rows: Vec<TransactionRow> = transactions.iter().map(Into::into).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..6)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn write_csv<W: io::Write>(transactions: &[BrokerTransaction], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(tx)?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_gbp(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}

fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
