use crate::{
    constants::{CSV_ADDRESS_PREFIX_CHARS, CSV_DESCRIPTION_HASH_CHARS, CSV_FILE_PREFIX},
    models::{CanonicalTransaction, TxType},
    utils::take_chars,
};

/// Column order expected by the Awaken tax import. Changing it breaks imports.
const CSV_HEADERS: [&str; 10] = [
    "Timestamp",
    "Sent Asset",
    "Sent Amount",
    "Received Asset",
    "Received Amount",
    "Fee Asset",
    "Fee Amount",
    "Tag",
    "Description",
    "TxID",
];

fn csv_header() -> String {
    CSV_HEADERS.join(",")
}

/// Which side of the row the amount lands on, and the Awaken tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Sent,
    Received,
}

fn tag_for(tx_type: TxType) -> (Direction, &'static str) {
    match tx_type {
        TxType::Send => (Direction::Sent, "Send"),
        TxType::Receive => (Direction::Received, "Receive"),
        TxType::Swap => (Direction::Sent, "Coin Swap"),
        TxType::Delegate => (Direction::Sent, "Stake Deposit"),
        TxType::Undelegate => (Direction::Received, "Stake Withdrawal"),
        TxType::ClaimRewards => (Direction::Received, "Claim Rewards"),
        TxType::IbcTransfer => (Direction::Sent, "Send"),
        TxType::Transfer | TxType::FailedTx => (Direction::Sent, "Transfer"),
    }
}

// Quote only fields that would otherwise break the row.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_csv_row(tx: &CanonicalTransaction) -> String {
    let (direction, tag) = tag_for(tx.tx_type);
    let (sent_asset, sent_amount, received_asset, received_amount) = match direction {
        Direction::Sent => (tx.token.as_str(), tx.amount.as_str(), "", ""),
        Direction::Received => ("", "", tx.token.as_str(), tx.amount.as_str()),
    };
    let timestamp = tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    let description = format!(
        "{} - {}...",
        tx.tx_type,
        take_chars(&tx.hash, CSV_DESCRIPTION_HASH_CHARS)
    );

    [
        timestamp.as_str(),
        sent_asset,
        sent_amount,
        received_asset,
        received_amount,
        tx.token.as_str(),
        tx.fee.as_str(),
        tag,
        description.as_str(),
        tx.hash.as_str(),
    ]
    .iter()
    .map(|field| escape_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Render records as an Awaken import file: header plus one row per record,
/// newline separated, no trailing newline.
pub fn to_csv(transactions: &[CanonicalTransaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(csv_header());
    lines.extend(transactions.iter().map(format_csv_row));
    lines.join("\n")
}

/// `universal-explorer-awaken-<TICKER>-<first 10 chars of address>.csv`
pub fn export_file_name(ticker: &str, address: &str) -> String {
    let prefix: String = take_chars(address.trim(), CSV_ADDRESS_PREFIX_CHARS)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}-{}-{}.csv", CSV_FILE_PREFIX, ticker, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxStatus;
    use chrono::{DateTime, Utc};

    const HEADER: &str = "Timestamp,Sent Asset,Sent Amount,Received Asset,Received Amount,Fee Asset,Fee Amount,Tag,Description,TxID";

    fn tx(tx_type: TxType) -> CanonicalTransaction {
        CanonicalTransaction {
            hash: "0xabcdef0123456789".to_string(),
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            from: "A".to_string(),
            to: "B".to_string(),
            amount: "10.000000".to_string(),
            token: "DOT".to_string(),
            fee: "0.015600".to_string(),
            tx_type,
            status: TxStatus::Success,
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        // Memastikan ekspor kosong hanya berisi header
        assert_eq!(to_csv(&[]), HEADER);
    }

    #[test]
    fn send_row_fills_sent_columns() {
        let csv = to_csv(&[tx(TxType::Send)]);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2023-11-14 22:13:20,DOT,10.000000,,,DOT,0.015600,Send,Send - 0xabcdef0123...,0xabcdef0123456789"
        );
    }

    #[test]
    fn tag_table_matches_awaken_import() {
        // Memastikan setiap tipe dipetakan ke kolom dan tag yang benar
        let cases = [
            (TxType::Send, true, "Send"),
            (TxType::Receive, false, "Receive"),
            (TxType::Swap, true, "Coin Swap"),
            (TxType::Delegate, true, "Stake Deposit"),
            (TxType::Undelegate, false, "Stake Withdrawal"),
            (TxType::ClaimRewards, false, "Claim Rewards"),
            (TxType::IbcTransfer, true, "Send"),
            (TxType::Transfer, true, "Transfer"),
            (TxType::FailedTx, true, "Transfer"),
        ];
        for (tx_type, sent, tag) in cases {
            let row = format_csv_row(&tx(tx_type));
            let fields: Vec<&str> = row.split(',').collect();
            assert_eq!(fields.len(), 10, "row: {}", row);
            if sent {
                assert_eq!((fields[1], fields[2]), ("DOT", "10.000000"));
                assert_eq!((fields[3], fields[4]), ("", ""));
            } else {
                assert_eq!((fields[1], fields[2]), ("", ""));
                assert_eq!((fields[3], fields[4]), ("DOT", "10.000000"));
            }
            assert_eq!(fields[5], "DOT");
            assert_eq!(fields[6], "0.015600");
            assert_eq!(fields[7], tag);
            assert_eq!(fields[8], format!("{} - 0xabcdef0123...", tx_type));
        }
    }

    #[test]
    fn missing_hash_gives_empty_txid() {
        let mut record = tx(TxType::Transfer);
        record.hash = String::new();
        let row = format_csv_row(&record);
        assert!(row.ends_with(",Transfer - ...,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut record = tx(TxType::Send);
        record.token = "ibc/A,B".to_string();
        let row = format_csv_row(&record);
        assert!(row.contains(",\"ibc/A,B\",10.000000,"));
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,\"b\""), "\"a,\"\"b\"\"\"");
    }

    #[test]
    fn export_file_name_uses_ticker_and_address_prefix() {
        assert_eq!(
            export_file_name("ATOM", "cosmos1qypqxpq9qprsttsbfaesw4yz2zn0lcw0pfmx5k3"),
            "universal-explorer-awaken-ATOM-cosmos1qyp.csv"
        );
        assert_eq!(
            export_file_name("BNB", "0x12\"34"),
            "universal-explorer-awaken-BNB-0x1234.csv"
        );
    }
}
