use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use serde_json::json;

use crate::application::LedgerService;
use crate::domain::{
    format_money, parse_money, Account, AccountId, Favorite, FavoriteId, IdGenerator, Money,
    Payment, PaymentId, PaymentStatus, RandomIds, SequentialIds,
};
use crate::storage::InMemoryRepository;

/// Wallet - in-memory wallet ledger
///
/// Runs a session of ledger commands, one per line, against a fresh in-memory
/// ledger. State does not outlive the session.
#[derive(Parser)]
#[command(name = "wallet")]
#[command(about = "Run a session of wallet ledger commands against an in-memory ledger")]
#[command(version)]
pub struct Cli {
    /// Session script to run (reads stdin if omitted)
    #[arg(short, long, env = "WALLET_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, env = "WALLET_FORMAT")]
    pub format: OutputFormat,

    /// Number payments and favorites 00000000-0000-0000-0000-000000000001, ...02, ...
    #[arg(long, env = "WALLET_DETERMINISTIC_IDS")]
    pub deterministic_ids: bool,

    /// Stop at the first failing command
    #[arg(long)]
    pub fail_fast: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ids: Box<dyn IdGenerator> = if self.deterministic_ids {
            Box::new(SequentialIds::new())
        } else {
            Box::new(RandomIds)
        };

        let stdout = io::stdout();
        let mut session = Session::new(ids, self.format, stdout.lock());

        let summary = match &self.script {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open script {}", path.display()))?;
                session.run_script(BufReader::new(file), self.fail_fast)?
            }
            None => session.run_script(io::stdin().lock(), self.fail_fast)?,
        };

        info!(
            "Session finished: {} command(s), {} failed",
            summary.executed, summary.failed
        );

        if summary.failed > 0 {
            anyhow::bail!("{} of {} command(s) failed", summary.failed, summary.executed);
        }
        Ok(())
    }
}

/// One line of a session script.
#[derive(Parser)]
#[command(name = "session", no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Register an account for a phone number
    Register { phone: String },

    /// Show an account
    Account { id: AccountId },

    /// List all accounts
    Accounts,

    /// Deposit funds (e.g., "1000" or "12.50")
    Deposit {
        account: AccountId,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Pay from an account for a category
    Pay {
        account: AccountId,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        category: String,
    },

    /// Show a payment ("last" for the most recent one)
    Payment { id: String },

    /// List payments
    Payments {
        /// Only payments of this account
        #[arg(long)]
        account: Option<AccountId>,
        /// Only payments in this status (in_progress, completed, rejected)
        #[arg(long)]
        status: Option<String>,
    },

    /// Reject an in-progress payment and refund it
    Reject { payment: String },

    /// Make the same payment again
    Repeat { payment: String },

    /// Save a payment as a named favorite
    Favorite {
        payment: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Show a favorite ("last" for the most recent one)
    ShowFavorite { id: String },

    /// List all favorites
    Favorites,

    /// Pay using a favorite
    PayFavorite { favorite: String },

    /// Verify ledger integrity
    Check,
}

/// Counts reported at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub executed: usize,
    pub failed: usize,
}

/// A ledger plus the output it reports to. Each script line is executed in order;
/// a failing line is reported and, unless fail-fast is set, the session goes on.
pub struct Session<W: Write> {
    service: LedgerService<InMemoryRepository, Box<dyn IdGenerator>>,
    format: OutputFormat,
    out: W,
    last_payment: Option<PaymentId>,
    last_favorite: Option<FavoriteId>,
}

impl<W: Write> Session<W> {
    pub fn new(ids: Box<dyn IdGenerator>, format: OutputFormat, out: W) -> Self {
        Self {
            service: LedgerService::with_ids(ids),
            format,
            out,
            last_payment: None,
            last_favorite: None,
        }
    }

    pub fn service(&self) -> &LedgerService<InMemoryRepository, Box<dyn IdGenerator>> {
        &self.service
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute every command in `reader`. Blank lines and lines starting with `#`
    /// are skipped. Only I/O failures abort the session with an error.
    pub fn run_script<B: BufRead>(&mut self, reader: B, fail_fast: bool) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read session script")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            summary.executed += 1;
            debug!("line {}: {}", idx + 1, line);

            if let Err(err) = self.execute_line(line) {
                summary.failed += 1;
                warn!("line {}: {:#}", idx + 1, err);
                writeln!(self.out, "error: {:#}", err)?;
                if fail_fast {
                    break;
                }
            }
        }

        self.out.flush()?;
        Ok(summary)
    }

    /// Parse and execute a single command line.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        let tokens = split_args(line)?;
        let parsed = match SessionLine::try_parse_from(&tokens) {
            Ok(parsed) => parsed,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                write!(self.out, "{}", err)?;
                return Ok(());
            }
            Err(err) => anyhow::bail!("{}", clap_message(&err)),
        };
        self.execute(parsed.command)
    }

    fn execute(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Register { phone } => {
                let account = self.service.register_account(phone)?;
                self.print_account(&account)?;
            }

            SessionCommand::Account { id } => {
                let account = self.service.find_account_by_id(id)?;
                self.print_account(&account)?;
            }

            SessionCommand::Accounts => {
                let accounts = self.service.accounts()?;
                match self.format {
                    OutputFormat::Json => self.print_json(&accounts)?,
                    OutputFormat::Table => {
                        if accounts.is_empty() {
                            writeln!(self.out, "No accounts.")?;
                        }
                        for account in &accounts {
                            self.print_account(account)?;
                        }
                    }
                }
            }

            SessionCommand::Deposit { account, amount } => {
                let amount = parse_amount(&amount)?;
                self.service.deposit(account, amount)?;
                let balance = self.service.find_account_by_id(account)?.balance;
                match self.format {
                    OutputFormat::Json => self.print_json(&json!({
                        "account_id": account,
                        "deposited": amount,
                        "balance": balance,
                    }))?,
                    OutputFormat::Table => writeln!(
                        self.out,
                        "Deposited {} to account {} (balance {})",
                        format_money(amount),
                        account,
                        format_money(balance)
                    )?,
                }
            }

            SessionCommand::Pay {
                account,
                amount,
                category,
            } => {
                let amount = parse_amount(&amount)?;
                let payment = self.service.pay(account, amount, category)?;
                self.last_payment = Some(payment.id);
                self.print_payment(&payment)?;
            }

            SessionCommand::Payment { id } => {
                let id = self.resolve_payment(&id)?;
                let payment = self.service.find_payment_by_id(id)?;
                self.print_payment(&payment)?;
            }

            SessionCommand::Payments { account, status } => {
                let status = status
                    .map(|s| {
                        PaymentStatus::from_str(&s).with_context(|| {
                            format!(
                                "Invalid payment status '{}' (expected in_progress, completed or rejected)",
                                s
                            )
                        })
                    })
                    .transpose()?;
                let mut payments = match account {
                    Some(account_id) => self.service.payments_for_account(account_id)?,
                    None => self.service.payments()?,
                };
                if let Some(status) = status {
                    payments.retain(|p| p.status == status);
                }
                match self.format {
                    OutputFormat::Json => self.print_json(&payments)?,
                    OutputFormat::Table => {
                        if payments.is_empty() {
                            writeln!(self.out, "No payments.")?;
                        }
                        for payment in &payments {
                            self.print_payment(payment)?;
                        }
                    }
                }
            }

            SessionCommand::Reject { payment } => {
                let id = self.resolve_payment(&payment)?;
                self.service.reject(id)?;
                let payment = self.service.find_payment_by_id(id)?;
                match self.format {
                    OutputFormat::Json => self.print_json(&payment)?,
                    OutputFormat::Table => writeln!(
                        self.out,
                        "Rejected payment {}, refunded {} to account {}",
                        payment.id,
                        format_money(payment.amount),
                        payment.account_id
                    )?,
                }
            }

            SessionCommand::Repeat { payment } => {
                let id = self.resolve_payment(&payment)?;
                let payment = self.service.repeat(id)?;
                self.last_payment = Some(payment.id);
                self.print_payment(&payment)?;
            }

            SessionCommand::Favorite { payment, name } => {
                let id = self.resolve_payment(&payment)?;
                let favorite = self.service.favorite_payment(id, name.join(" "))?;
                self.last_favorite = Some(favorite.id);
                self.print_favorite(&favorite)?;
            }

            SessionCommand::ShowFavorite { id } => {
                let id = self.resolve_favorite(&id)?;
                let favorite = self.service.find_favorite_by_id(id)?;
                self.print_favorite(&favorite)?;
            }

            SessionCommand::Favorites => {
                let favorites = self.service.favorites()?;
                match self.format {
                    OutputFormat::Json => self.print_json(&favorites)?,
                    OutputFormat::Table => {
                        if favorites.is_empty() {
                            writeln!(self.out, "No favorites.")?;
                        }
                        for favorite in &favorites {
                            self.print_favorite(favorite)?;
                        }
                    }
                }
            }

            SessionCommand::PayFavorite { favorite } => {
                let id = self.resolve_favorite(&favorite)?;
                let payment = self.service.pay_from_favorite(id)?;
                self.last_payment = Some(payment.id);
                self.print_payment(&payment)?;
            }

            SessionCommand::Check => self.run_check()?,
        }

        Ok(())
    }

    fn run_check(&mut self) -> Result<()> {
        let report = self.service.check_integrity()?;

        match self.format {
            OutputFormat::Json => self.print_json(&report)?,
            OutputFormat::Table => {
                writeln!(self.out, "Accounts:    {}", report.account_count)?;
                writeln!(self.out, "Payments:    {}", report.payment_count)?;
                writeln!(self.out, "Favorites:   {}", report.favorite_count)?;
                writeln!(
                    self.out,
                    "Balances:    {:>12}",
                    format_money(report.total_balance)
                )?;
                writeln!(
                    self.out,
                    "In progress: {:>12}",
                    format_money(report.in_progress_amount)
                )?;
                if report.is_healthy() {
                    writeln!(self.out, "Ledger is consistent.")?;
                } else {
                    writeln!(self.out, "Issues found:")?;
                    for issue in &report.issues {
                        writeln!(self.out, "  - {}", issue)?;
                    }
                }
            }
        }

        if !report.is_healthy() {
            anyhow::bail!("Ledger integrity check failed");
        }
        Ok(())
    }

    fn resolve_payment(&self, token: &str) -> Result<PaymentId> {
        if token == "last" {
            return self.last_payment.context("No payment has been made yet");
        }
        PaymentId::parse_str(token).context("Invalid payment ID format (expected UUID)")
    }

    fn resolve_favorite(&self, token: &str) -> Result<FavoriteId> {
        if token == "last" {
            return self.last_favorite.context("No favorite has been saved yet");
        }
        FavoriteId::parse_str(token).context("Invalid favorite ID format (expected UUID)")
    }

    fn print_account(&mut self, account: &Account) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.print_json(account),
            OutputFormat::Table => {
                writeln!(
                    self.out,
                    "Account {:<6} {:<16} {:>14}",
                    account.id,
                    account.phone,
                    format_money(account.balance)
                )?;
                Ok(())
            }
        }
    }

    fn print_payment(&mut self, payment: &Payment) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.print_json(payment),
            OutputFormat::Table => {
                writeln!(
                    self.out,
                    "Payment {}  account {:<6} {:>14}  {:<16} {}",
                    payment.id,
                    payment.account_id,
                    format_money(payment.amount),
                    truncate(&payment.category, 16),
                    payment.status
                )?;
                Ok(())
            }
        }
    }

    fn print_favorite(&mut self, favorite: &Favorite) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.print_json(favorite),
            OutputFormat::Table => {
                writeln!(
                    self.out,
                    "Favorite {}  account {:<6} {:>14}  {:<16} \"{}\"",
                    favorite.id,
                    favorite.account_id,
                    format_money(favorite.amount),
                    truncate(&favorite.category, 16),
                    favorite.name
                )?;
                Ok(())
            }
        }
    }

    fn print_json<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }
}

fn parse_amount(input: &str) -> Result<Money> {
    parse_money(input).context("Invalid amount format. Use '50.00' or '50'")
}

/// Split a command line on whitespace, keeping double-quoted runs together.
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        anyhow::bail!("Unterminated quote in: {}", line);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// First line of a clap error without its "error: " prefix.
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args() {
        assert_eq!(
            split_args("pay 1 100 auto").unwrap(),
            vec!["pay", "1", "100", "auto"]
        );
        assert_eq!(
            split_args("  favorite last   \"my  auto\" ").unwrap(),
            vec!["favorite", "last", "my  auto"]
        );
        assert_eq!(split_args("pay 1 5 \"\"").unwrap(), vec!["pay", "1", "5", ""]);
        assert!(split_args("pay 1 5 \"auto").is_err());
        assert!(split_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("auto", 16), "auto");
        assert_eq!(truncate("a very long category", 10), "a very ...");
    }

    #[test]
    fn test_last_requires_prior_payment() {
        let mut session = Session::new(
            Box::new(SequentialIds::new()),
            OutputFormat::Table,
            Vec::new(),
        );
        let err = session.execute_line("reject last").unwrap_err();
        assert_eq!(err.to_string(), "No payment has been made yet");
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut session = Session::new(
            Box::new(SequentialIds::new()),
            OutputFormat::Table,
            Vec::new(),
        );
        assert!(session.execute_line("withdraw 1 100").is_err());
        assert!(session.execute_line("register").is_err());
    }
}
