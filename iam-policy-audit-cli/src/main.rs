//! `iam-policy-audit`: read-only audits of IAM and IAM Identity Center policies

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use iam_policy_audit_core::report::{
    write_report, write_rows, DuplicatePairRow, PolicyDiffRow, PolicyMatchRow,
    SharedManagedPolicyRow,
};
use iam_policy_audit_core::{
    find_duplicate_statements_with, AwsSettings, ErrorPolicy, PolicyAuditService, PolicySearch,
    PrincipalKind, ScanOptions,
};
use log::debug;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "iam-policy-audit",
    version,
    about = "Audit IAM and IAM Identity Center policies for duplicate and overlapping grants"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    aws: AwsArgs,

    #[command(flatten)]
    scan: ScanArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find duplicate statements in a local policy document (reads stdin when FILE is omitted)
    CheckPolicy {
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Find duplicate statements in permission set (or IAM principal) inline policies
    DuplicateStatements {
        /// Scan IAM principal inline policies instead of permission sets
        #[arg(long)]
        iam: bool,

        /// IAM principal types to scan with --iam (user, role, group)
        #[arg(long = "principal-type", value_delimiter = ',', requires = "iam")]
        principal_types: Vec<PrincipalKind>,
    },

    /// Find permission sets sharing inline policies, statements or managed policies
    DuplicatePolicies,

    /// Count inline policy statements per permission set
    StatementCount,

    /// List IAM group policies missing from a permission set
    GroupDiff {
        /// IAM group names, as a JSON array or a comma separated list
        #[arg(long)]
        groups: String,

        /// Name of the permission set to compare against
        #[arg(long)]
        permission_set: String,
    },

    /// List IAM users of the current account with their creation dates
    IamUsers,

    /// List Identity Store users that were created manually rather than provisioned
    IdentityStoreUsers {
        /// Include users provisioned by an external identity provider
        #[arg(long)]
        all: bool,
    },

    /// Find permission sets whose policies mention a keyword, with their account assignments
    PermissionSetSearch {
        /// Keywords matched against attached managed policy names and ARNs
        #[arg(long, value_delimiter = ',')]
        managed: Vec<String>,

        /// Keywords matched against the inline policy text
        #[arg(long, value_delimiter = ',')]
        inline: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct AwsArgs {
    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE", global = true)]
    profile: Option<String>,

    /// AWS region to use
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// IAM Identity Center instance ARN (defaults to the first instance)
    #[arg(long, env = "IAM_POLICY_AUDIT_INSTANCE_ARN", global = true)]
    instance_arn: Option<String>,

    /// Directory for CSV reports
    #[arg(long, default_value = "outputs", global = true)]
    output_dir: PathBuf,
}

impl AwsArgs {
    fn settings(&self) -> AwsSettings {
        AwsSettings::new(self.profile.clone(), self.region.clone())
    }
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Log statement pairs that fail to compare and keep scanning instead of stopping
    #[arg(long, global = true)]
    keep_going: bool,
}

impl ScanArgs {
    fn options(&self) -> ScanOptions {
        if self.keep_going {
            ScanOptions::new(ErrorPolicy::CollectAndContinue)
        } else {
            ScanOptions::default()
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        aws, scan, command, ..
    } = cli;
    match command {
        Command::CheckPolicy { file, format } => check_policy(file.as_deref(), format, &scan),
        Command::DuplicateStatements {
            iam,
            principal_types,
        } => {
            let service = PolicyAuditService::new(&aws.settings()).await;
            if iam {
                let kinds = if principal_types.is_empty() {
                    PrincipalKind::ALL.to_vec()
                } else {
                    principal_types
                };
                let rows = service
                    .iam_duplicate_statements(&kinds, &scan.options())
                    .await
                    .context("Failed to scan IAM inline policies")?;
                save(&aws.output_dir, "iam_duplicate_inline_statements", &rows, "No duplicates found.")
            } else {
                let rows = service
                    .duplicate_statements(aws.instance_arn.as_deref(), &scan.options())
                    .await
                    .context("Failed to scan permission set inline policies")?;
                save(&aws.output_dir, "duplicate_inline_statements", &rows, "No duplicates found.")
            }
        }
        Command::DuplicatePolicies => {
            let service = PolicyAuditService::new(&aws.settings()).await;
            let report = service
                .duplicate_policies(aws.instance_arn.as_deref())
                .await
                .context("Failed to compare permission set policies")?;

            let inline: Vec<PolicyMatchRow> =
                report.inline_matches.iter().map(PolicyMatchRow::from).collect();
            save(
                &aws.output_dir,
                "duplicate_inline_policies",
                &inline,
                "No duplicate inline policies found.",
            )?;
            let managed: Vec<SharedManagedPolicyRow> = report
                .shared_managed_policies
                .iter()
                .map(SharedManagedPolicyRow::from)
                .collect();
            save(
                &aws.output_dir,
                "duplicate_managed_policies",
                &managed,
                "No duplicate managed policies found.",
            )
        }
        Command::StatementCount => {
            let service = PolicyAuditService::new(&aws.settings()).await;
            let report = service
                .statement_counts(aws.instance_arn.as_deref())
                .await
                .context("Failed to count inline policy statements")?;
            eprintln!(
                "Total statements across {} permission sets: {}",
                report.rows.len(),
                report.total
            );
            save(
                &aws.output_dir,
                "inline_policy_statements_count",
                &report.rows,
                "No permission sets found.",
            )
        }
        Command::GroupDiff {
            groups,
            permission_set,
        } => {
            let groups = parse_groups(&groups)?;
            let service = PolicyAuditService::new(&aws.settings()).await;
            let diff = service
                .group_diff(aws.instance_arn.as_deref(), &groups, &permission_set)
                .await
                .context("Failed to diff group policies against the permission set")?;
            let rows: Vec<PolicyDiffRow> = diff.iter().map(PolicyDiffRow::from).collect();
            save(
                &aws.output_dir,
                "iam_to_permissionset_diff",
                &rows,
                "Permission set already grants everything the groups grant.",
            )
        }
        Command::IamUsers => {
            let service = PolicyAuditService::new(&aws.settings()).await;
            let rows = service.iam_users().await.context("Failed to list IAM users")?;
            save(&aws.output_dir, "iam_users", &rows, "No IAM users found.")
        }
        Command::IdentityStoreUsers { all } => {
            let service = PolicyAuditService::new(&aws.settings()).await;
            let rows = service
                .identity_store_users(aws.instance_arn.as_deref(), !all)
                .await
                .context("Failed to list Identity Store users")?;
            let prefix = if all { "all_users" } else { "manual_users" };
            save(&aws.output_dir, prefix, &rows, "No users found.")
        }
        Command::PermissionSetSearch { managed, inline } => {
            let search = PolicySearch::new(&managed, &inline);
            if search.is_empty() {
                bail!("permission-set-search needs at least one --managed or --inline keyword");
            }
            let service = PolicyAuditService::new(&aws.settings()).await;
            let rows = service
                .search_permission_sets(aws.instance_arn.as_deref(), &search)
                .await
                .context("Failed to search permission sets")?;
            save(
                &aws.output_dir,
                "permission_set_search",
                &rows,
                "No permission sets matched.",
            )
        }
    }
}

fn check_policy(file: Option<&Path>, format: OutputFormat, scan: &ScanArgs) -> Result<()> {
    let policy = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read policy from stdin")?;
            buffer
        }
    };

    let result = find_duplicate_statements_with(&policy, &scan.options())
        .context("Failed to classify policy statements")?;
    debug!(
        "{} duplicate pairs, {} pair errors",
        result.pairs.len(),
        result.errors.len()
    );
    for error in &result.errors {
        eprintln!(
            "Statements {} and {} could not be compared: {}",
            error.first_index, error.second_index, error.message
        );
    }

    let stdout = std::io::stdout();
    match format {
        OutputFormat::Csv => {
            let rows: Vec<DuplicatePairRow> =
                result.pairs.iter().map(DuplicatePairRow::from).collect();
            write_rows(stdout.lock(), &rows)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(stdout.lock(), &result.pairs)?;
            println!();
        }
    }
    eprintln!("Found {} duplicate statement pairs", result.pairs.len());
    Ok(())
}

fn save<T: Serialize>(dir: &Path, prefix: &str, rows: &[T], empty_message: &str) -> Result<()> {
    if rows.is_empty() {
        eprintln!("{empty_message}");
        return Ok(());
    }
    let path = write_report(dir, prefix, rows)?;
    eprintln!("Saved {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Accept `["a","b"]` as well as `a,b`
fn parse_groups(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    let groups: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("--groups is not a valid JSON array of strings")?
    } else {
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .map(str::to_string)
            .collect()
    };
    if groups.is_empty() {
        bail!("--groups must name at least one IAM group");
    }
    Ok(groups)
}
