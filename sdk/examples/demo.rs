//! Terminal walkthrough of the transaction lifecycle.
//!
//! Derives two accounts from a mnemonic, builds a transfer, signs it alone
//! and then with a gas payer, and decodes both from their wire form. Runs
//! fully offline.
//!
//! Run with:
//!   cargo run --example demo

use primitive_types::U256;

use thor_sdk::config::DEFAULT_DERIVATION_PATH;
use thor_sdk::crypto::PrivateKey;
use thor_sdk::delegation::LocalGasPayer;
use thor_sdk::identity::{generate_mnemonic, HdKey};
use thor_sdk::logging::{init_logging, LogFormat};
use thor_sdk::transaction::{
    legacy_to_dynamic, sign_transaction, sign_with_remote_gas_payer, verify_signed_transaction,
    Clause, SignedTransaction, TransactionBuilder,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

fn step(n: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}[{n}] {title}{RESET}");
}

fn field(name: &str, value: impl std::fmt::Display) {
    println!("    {DIM}{name:<18}{RESET} {value}");
}

#[tokio::main]
async fn main() -> thor_sdk::Result<()> {
    init_logging("warn", LogFormat::from_str_lossy(&std::env::var("LOG_FORMAT").unwrap_or_default()));

    step(1, "Accounts from a fresh mnemonic");
    let words = generate_mnemonic(12)?;
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let root = HdKey::from_mnemonic(&words, DEFAULT_DERIVATION_PATH, None)?;
    let alice = root.derive_child(0)?;
    let bob = root.derive_child(1)?;
    field("alice", alice.address());
    field("bob", bob.address());

    step(2, "Build a transfer");
    let body = TransactionBuilder::new()
        .chain_tag(0x27)?
        .block_ref([0u8, 0, 0, 0, 0xaa, 0xbb, 0xcc, 0xdd])?
        .expiration(720)?
        .clause(Clause::transfer(bob.address(), U256::exp10(18)).with_comment("1 VET to bob"))?
        .gas(21_000)?
        .gas_price_coef(128)?
        .nonce(1)?
        .build()?;
    field("intrinsic gas", body.intrinsic_gas());
    field("signing hash", format!("0x{}", hex::encode(body.signing_hash())));

    step(3, "Sign and round-trip");
    let alice_key = alice.private_key()?;
    let signed = sign_transaction(body.clone(), &alice_key)?;
    let wire = signed.encode();
    let decoded = SignedTransaction::decode(&wire)?;
    field("wire bytes", wire.len());
    field("id", format!("0x{}", hex::encode(decoded.id())));
    field("origin", decoded.origin()?);

    step(4, "Same transfer, gas paid by a sponsor");
    let sponsor = LocalGasPayer::new(PrivateKey::generate());
    let delegated_body = TransactionBuilder::from_body(&body).delegated(true)?.build()?;
    let delegated = sign_with_remote_gas_payer(delegated_body, &alice_key, &sponsor).await?;
    verify_signed_transaction(&delegated, &alice.address(), Some(&sponsor.address()))?;
    field("signature bytes", delegated.signature().len());
    field("gas payer", delegated.gas_payer()?);

    step(5, "Legacy coefficient as dynamic fees");
    let base_fee = U256::from(10_000_000_000_000u64);
    let dynamic = legacy_to_dynamic(128, base_fee)?;
    field("base fee", base_fee);
    field("coef 128 becomes", format!("{dynamic:?}"));

    println!();
    println!("{GREEN}{BOLD}done{RESET}");
    Ok(())
}
