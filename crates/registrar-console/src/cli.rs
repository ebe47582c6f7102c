//! Command line definition

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use registrar_model::{RequestStatus, RequestType};
use std::path::PathBuf;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Summary,
    Pending(RequestType),
    SetStatus {
        request_type: RequestType,
        id: u64,
        status: RequestStatus,
        notes: String,
        epp_code: Option<String>,
    },
    Invoices,
    MarkPaid(u64),
    CancelInvoice(u64),
    Tickets,
    Ticket(u64),
    Reply { id: u64, message: String },
    Notifications { watch: bool },
    /// `None` marks everything read
    MarkRead(Option<u64>),
    Logout,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub session: Option<String>,
    pub log_json: bool,
    pub action: Action,
}

fn parse_request_type(s: &str) -> Result<RequestType, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_status(s: &str) -> Result<RequestStatus, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help(help)
}

/// Build the command tree
#[must_use]
pub fn command() -> Command {
    Command::new("registrar-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Admin console for the registrar backend")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .env("REGISTRAR_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Backend base URL (overrides config and REGISTRAR_BASE_URL)"),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .global(true)
                .help("Session cookie, e.g. 'session=...'"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("summary").about("Dashboard counters and recent pending requests"))
        .subcommand(
            Command::new("pending").about("Pending requests of one type").arg(
                Arg::new("type")
                    .required(true)
                    .value_parser(parse_request_type)
                    .help("Request type, e.g. register, transfer_out, dns-change"),
            ),
        )
        .subcommand(
            Command::new("set-status")
                .about("Move a request to a new status")
                .arg(
                    Arg::new("type")
                        .required(true)
                        .value_parser(parse_request_type),
                )
                .arg(id_arg("Request id"))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(parse_status)
                        .help("Target status, e.g. 'Approved'"),
                )
                .arg(
                    Arg::new("notes")
                        .long("notes")
                        .default_value("")
                        .help("Admin notes"),
                )
                .arg(
                    Arg::new("epp-code")
                        .long("epp-code")
                        .help("EPP code for transfer-out"),
                ),
        )
        .subcommand(Command::new("invoices").about("All invoices"))
        .subcommand(
            Command::new("mark-paid")
                .about("Mark an invoice paid")
                .arg(id_arg("Invoice id")),
        )
        .subcommand(
            Command::new("cancel-invoice")
                .about("Cancel an unpaid invoice")
                .arg(id_arg("Invoice id")),
        )
        .subcommand(Command::new("tickets").about("All support tickets"))
        .subcommand(
            Command::new("ticket")
                .about("One ticket with its replies")
                .arg(id_arg("Ticket id")),
        )
        .subcommand(
            Command::new("reply")
                .about("Reply to a ticket")
                .arg(id_arg("Ticket id"))
                .arg(Arg::new("message").required(true)),
        )
        .subcommand(
            Command::new("notifications")
                .about("Show notifications")
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Keep polling until interrupted"),
                ),
        )
        .subcommand(
            Command::new("mark-read")
                .about("Mark notifications read")
                .arg(Arg::new("id").value_parser(value_parser!(u64)))
                .arg(Arg::new("all").long("all").action(ArgAction::SetTrue))
                .group(ArgGroup::new("target").args(["id", "all"]).required(true)),
        )
        .subcommand(Command::new("logout").about("End the backend session"))
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, name: &str) -> anyhow::Result<T> {
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing argument <{name}>"))
}

/// Turn matches into an [`Invocation`]
///
/// # Errors
/// Fails when a required argument is absent, which clap normally rules out.
pub fn parse(matches: &ArgMatches) -> anyhow::Result<Invocation> {
    let action = match matches.subcommand() {
        Some(("summary", _)) => Action::Summary,
        Some(("pending", args)) => Action::Pending(required(args, "type")?),
        Some(("set-status", args)) => Action::SetStatus {
            request_type: required(args, "type")?,
            id: required(args, "id")?,
            status: required(args, "status")?,
            notes: args.get_one::<String>("notes").cloned().unwrap_or_default(),
            epp_code: args.get_one::<String>("epp-code").cloned(),
        },
        Some(("invoices", _)) => Action::Invoices,
        Some(("mark-paid", args)) => Action::MarkPaid(required(args, "id")?),
        Some(("cancel-invoice", args)) => Action::CancelInvoice(required(args, "id")?),
        Some(("tickets", _)) => Action::Tickets,
        Some(("ticket", args)) => Action::Ticket(required(args, "id")?),
        Some(("reply", args)) => Action::Reply {
            id: required(args, "id")?,
            message: required(args, "message")?,
        },
        Some(("notifications", args)) => Action::Notifications {
            watch: args.get_flag("watch"),
        },
        Some(("mark-read", args)) => Action::MarkRead(args.get_one::<u64>("id").copied()),
        Some(("logout", _)) => Action::Logout,
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    };

    Ok(Invocation {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        session: matches.get_one::<String>("session").cloned(),
        log_json: matches.get_flag("log-json"),
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_args(args: &[&str]) -> Invocation {
        let matches = command().try_get_matches_from(args).unwrap();
        parse(&matches).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn set_status_with_epp_code() {
        let invocation = parse_args(&[
            "registrar-console",
            "set-status",
            "transfer-out",
            "9",
            "EPP Code Sent",
            "--epp-code",
            "AUTH-1",
        ]);
        assert_eq!(
            invocation.action,
            Action::SetStatus {
                request_type: RequestType::TransferOut,
                id: 9,
                status: RequestStatus::EppCodeSent,
                notes: String::new(),
                epp_code: Some("AUTH-1".to_string()),
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let invocation = parse_args(&["registrar-console", "pending", "dns_change", "--base-url", "http://x"]);
        assert_eq!(invocation.action, Action::Pending(RequestType::DnsChange));
        assert_eq!(invocation.base_url.as_deref(), Some("http://x"));
    }

    #[test]
    fn mark_read_needs_a_target() {
        assert!(command().try_get_matches_from(["registrar-console", "mark-read"]).is_err());
        assert!(command()
            .try_get_matches_from(["registrar-console", "mark-read", "3", "--all"])
            .is_err());
        assert_eq!(parse_args(&["registrar-console", "mark-read", "--all"]).action, Action::MarkRead(None));
        assert_eq!(parse_args(&["registrar-console", "mark-read", "3"]).action, Action::MarkRead(Some(3)));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(command()
            .try_get_matches_from(["registrar-console", "pending", "domains"])
            .is_err());
    }
}
