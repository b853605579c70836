// # cupictl - CUPI diagnostics CLI
//
// Thin shell over `cupi-core` for poking at a server by hand:
//
// - `list`   one page of a collection
// - `get`    one object, optionally with every field dumped
// - `delete` one object by id
//
// No provisioning logic lives here; every request goes through the typed
// resource API exactly as a library caller would send it.
//
// ## Configuration
//
// Every connection flag can come from the environment:
//
// - `CUPI_SERVER`: Host name or address of the server
// - `CUPI_PORT`: HTTPS port (default 8443)
// - `CUPI_USERNAME`: Administrator login
// - `CUPI_PASSWORD`: Administrator password
// - `CUPI_ACCEPT_INVALID_CERTS`: Accept self-signed certificates
// - `CUPI_TIMEOUT_SECS`: Per-request timeout
// - `CUPI_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export CUPI_SERVER=cuc.example.com
// export CUPI_USERNAME=admin
// export CUPI_PASSWORD=secret
//
// cupictl list call-handlers --query "(DisplayName startswith Sales)"
// cupictl get call-handler-templates 3f0c... --dump
// cupictl list alternate-extensions --parent <user object id>
// ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cupi_core::resources::{
    AlternateExtension, CallHandler, CallHandlerTemplate, DirectoryHandler, ExternalService, Mwi,
    PhoneSystem, Port, PortGroupServer, PostGreetingRecording, RestrictionTable, RoutingRule,
    ScheduleSet, Tenant,
};
use cupi_core::{BlockingServer, ConnectionServer, ListQuery, QueryClause, Resource, ServerConfig};
use cupi_transport_http::HttpTransport;
use std::fmt::Display;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: Command succeeded
/// - 1: Bad arguments or configuration
/// - 2: The request failed
#[derive(Debug, Clone, Copy)]
enum CupiExitCode {
    Success = 0,
    ConfigError = 1,
    RequestError = 2,
}

impl From<CupiExitCode> for ExitCode {
    fn from(code: CupiExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "cupictl", version, about = "Inspect CUPI resources on a voicemail server")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log level
    #[arg(long, env = "CUPI_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConnectionArgs {
    /// Server host name or address
    #[arg(long, env = "CUPI_SERVER", global = true)]
    server: Option<String>,

    /// HTTPS port
    #[arg(long, env = "CUPI_PORT", default_value_t = 8443, global = true)]
    port: u16,

    /// Administrator login
    #[arg(long, env = "CUPI_USERNAME", global = true)]
    username: Option<String>,

    /// Administrator password
    #[arg(long, env = "CUPI_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CUPI_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Accept self-signed certificates
    #[arg(long, env = "CUPI_ACCEPT_INVALID_CERTS", global = true)]
    accept_invalid_certs: bool,
}

impl ConnectionArgs {
    fn to_config(&self) -> Result<ServerConfig> {
        let server = self
            .server
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--server (or CUPI_SERVER) is required"))?;
        let username = self
            .username
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--username (or CUPI_USERNAME) is required"))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--password (or CUPI_PASSWORD) is required"))?;

        let config = ServerConfig::new(server, username, password)
            .with_port(self.port)
            .with_timeout_secs(self.timeout_secs)
            .with_accept_invalid_certs(self.accept_invalid_certs);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List one page of a collection
    List {
        kind: ResourceKind,

        /// Parent object id for nested collections
        #[arg(long)]
        parent: Option<String>,

        /// Filter clause, e.g. "(DisplayName startswith Sales)"; values that
        /// already start with `query=` or `sort=` are sent as given
        #[arg(long)]
        query: Vec<String>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Rows per page (resource or config default when omitted)
        #[arg(long)]
        rows: Option<u32>,

        /// Dump every field of each object
        #[arg(long)]
        dump: bool,
    },

    /// Fetch one object by id
    Get {
        kind: ResourceKind,

        object_id: String,

        /// Parent object id for nested collections
        #[arg(long)]
        parent: Option<String>,

        /// Dump every field
        #[arg(long)]
        dump: bool,
    },

    /// Delete one object by id
    Delete {
        kind: ResourceKind,

        object_id: String,

        /// Parent object id for nested collections
        #[arg(long)]
        parent: Option<String>,
    },
}

impl Command {
    fn target(&self) -> (ResourceKind, Option<&str>) {
        match self {
            Command::List { kind, parent, .. }
            | Command::Get { kind, parent, .. }
            | Command::Delete { kind, parent, .. } => (*kind, parent.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResourceKind {
    AlternateExtensions,
    CallHandlers,
    CallHandlerTemplates,
    DirectoryHandlers,
    ExternalServices,
    Mwis,
    PhoneSystems,
    Ports,
    PortGroupServers,
    PostGreetingRecordings,
    RestrictionTables,
    RoutingRules,
    ScheduleSets,
    Tenants,
}

impl ResourceKind {
    /// Name of the parent id `--parent` stands for, if the collection is nested
    fn parent_name(self) -> Option<&'static str> {
        match self {
            ResourceKind::AlternateExtensions | ResourceKind::Mwis => Some("user object id"),
            ResourceKind::PortGroupServers => Some("port group object id"),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!(
                "CUPI_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            );
            return CupiExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CupiExitCode::ConfigError.into();
    }

    let (kind, parent) = cli.command.target();
    if let Some(name) = kind.parent_name()
        && parent.is_none_or(|p| p.trim().is_empty())
    {
        eprintln!("--parent ({}) is required for {:?}", name, kind);
        return CupiExitCode::ConfigError.into();
    }

    let server = match connect(&cli.connection) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CupiExitCode::ConfigError.into();
        }
    };

    let server = match BlockingServer::from_server(server) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CupiExitCode::RequestError.into();
        }
    };

    let result = server.block_on(run(server.server(), &cli.command));
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            CupiExitCode::Success.into()
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            CupiExitCode::RequestError.into()
        }
    }
}

fn connect(args: &ConnectionArgs) -> Result<ConnectionServer> {
    let config = args.to_config()?;
    let transport = HttpTransport::new(&config)?;
    info!("Connecting to {}", config.base_url());
    Ok(ConnectionServer::new(config, Arc::new(transport))?)
}

/// Build the list query from `--query`, `--page` and `--rows`
///
/// A bare clause such as `(DisplayName startswith Sales)` becomes
/// `query=(DisplayName startswith Sales)`.
fn list_query(clauses: &[String], page: u32, rows: Option<u32>) -> ListQuery {
    let mut list_query = ListQuery::new().page(page);
    if let Some(rows) = rows {
        list_query = list_query.rows(rows);
    }
    for clause in clauses {
        let clause = clause.trim();
        let clause = if clause.starts_with("query=") || clause.starts_with("sort=") {
            QueryClause::raw(clause)
        } else {
            QueryClause::raw(format!("query={}", clause))
        };
        list_query = list_query.clause(clause);
    }
    list_query
}

async fn run(server: &ConnectionServer, command: &Command) -> Result<String> {
    match command {
        Command::List {
            kind,
            parent,
            query,
            page,
            rows,
            dump,
        } => {
            let list_query = list_query(query, *page, *rows);
            let parent = parent.as_deref().unwrap_or_default();
            list(server, *kind, parent, &list_query, *dump).await
        }
        Command::Get {
            kind,
            object_id,
            parent,
            dump,
        } => {
            let parent = parent.as_deref().unwrap_or_default();
            get(server, *kind, parent, object_id, *dump).await
        }
        Command::Delete {
            kind,
            object_id,
            parent,
        } => {
            let parent = parent.as_deref().unwrap_or_default();
            let result = match kind {
                ResourceKind::AlternateExtensions => {
                    AlternateExtension::delete_by_id(server, parent, object_id).await?
                }
                ResourceKind::CallHandlers => CallHandler::delete_by_id(server, object_id).await?,
                ResourceKind::CallHandlerTemplates => {
                    CallHandlerTemplate::delete_by_id(server, object_id).await?
                }
                ResourceKind::DirectoryHandlers => {
                    DirectoryHandler::delete_by_id(server, object_id).await?
                }
                ResourceKind::ExternalServices => {
                    ExternalService::delete_by_id(server, object_id).await?
                }
                ResourceKind::Mwis => Mwi::delete_by_id(server, parent, object_id).await?,
                ResourceKind::PhoneSystems => PhoneSystem::delete_by_id(server, object_id).await?,
                ResourceKind::Ports => Port::delete_by_id(server, object_id).await?,
                ResourceKind::PortGroupServers => {
                    PortGroupServer::delete_by_id(server, parent, object_id).await?
                }
                ResourceKind::PostGreetingRecordings => {
                    PostGreetingRecording::delete_by_id(server, object_id).await?
                }
                ResourceKind::RestrictionTables => {
                    RestrictionTable::delete_by_id(server, object_id).await?
                }
                ResourceKind::RoutingRules => RoutingRule::delete_by_id(server, object_id).await?,
                ResourceKind::ScheduleSets => ScheduleSet::delete_by_id(server, object_id).await?,
                ResourceKind::Tenants => Tenant::delete_by_id(server, object_id).await?,
            };
            Ok(format!("Deleted {} (HTTP {})", object_id, result.status_code))
        }
    }
}

async fn list(
    server: &ConnectionServer,
    kind: ResourceKind,
    parent: &str,
    query: &ListQuery,
    dump: bool,
) -> Result<String> {
    let output = match kind {
        ResourceKind::AlternateExtensions => {
            render_all(&AlternateExtension::list(server, parent, query).await?, dump)
        }
        ResourceKind::CallHandlers => render_all(&CallHandler::list(server, query).await?, dump),
        ResourceKind::CallHandlerTemplates => {
            render_all(&CallHandlerTemplate::list(server, query).await?, dump)
        }
        ResourceKind::DirectoryHandlers => {
            render_all(&DirectoryHandler::list(server, query).await?, dump)
        }
        ResourceKind::ExternalServices => {
            render_all(&ExternalService::list(server, query).await?, dump)
        }
        ResourceKind::Mwis => render_all(&Mwi::list(server, parent, query).await?, dump),
        ResourceKind::PhoneSystems => render_all(&PhoneSystem::list(server, query).await?, dump),
        ResourceKind::Ports => render_all(&Port::list(server, query).await?, dump),
        ResourceKind::PortGroupServers => {
            render_all(&PortGroupServer::list(server, parent, query).await?, dump)
        }
        ResourceKind::PostGreetingRecordings => {
            render_all(&PostGreetingRecording::list(server, query).await?, dump)
        }
        ResourceKind::RestrictionTables => {
            render_all(&RestrictionTable::list(server, query).await?, dump)
        }
        ResourceKind::RoutingRules => render_all(&RoutingRule::list(server, query).await?, dump),
        ResourceKind::ScheduleSets => render_all(&ScheduleSet::list(server, query).await?, dump),
        ResourceKind::Tenants => render_all(&Tenant::list(server, query).await?, dump),
    };
    Ok(output)
}

async fn get(
    server: &ConnectionServer,
    kind: ResourceKind,
    parent: &str,
    object_id: &str,
    dump: bool,
) -> Result<String> {
    let output = match kind {
        ResourceKind::AlternateExtensions => {
            render(&AlternateExtension::get(server, parent, object_id).await?, dump)
        }
        ResourceKind::CallHandlers => render(&CallHandler::get(server, object_id).await?, dump),
        ResourceKind::CallHandlerTemplates => {
            render(&CallHandlerTemplate::get(server, object_id).await?, dump)
        }
        ResourceKind::DirectoryHandlers => {
            render(&DirectoryHandler::get(server, object_id).await?, dump)
        }
        ResourceKind::ExternalServices => {
            render(&ExternalService::get(server, object_id).await?, dump)
        }
        ResourceKind::Mwis => render(&Mwi::get(server, parent, object_id).await?, dump),
        ResourceKind::PhoneSystems => render(&PhoneSystem::get(server, object_id).await?, dump),
        ResourceKind::Ports => render(&Port::get(server, object_id).await?, dump),
        ResourceKind::PortGroupServers => {
            render(&PortGroupServer::get(server, parent, object_id).await?, dump)
        }
        ResourceKind::PostGreetingRecordings => {
            render(&PostGreetingRecording::get(server, object_id).await?, dump)
        }
        ResourceKind::RestrictionTables => {
            render(&RestrictionTable::get(server, object_id).await?, dump)
        }
        ResourceKind::RoutingRules => render(&RoutingRule::get(server, object_id).await?, dump),
        ResourceKind::ScheduleSets => render(&ScheduleSet::get(server, object_id).await?, dump),
        ResourceKind::Tenants => render(&Tenant::get(server, object_id).await?, dump),
    };
    Ok(output)
}

fn render<T: Resource + Display>(item: &T, dump: bool) -> String {
    if dump {
        format!("{}\n{}", item, item.dump_all_props("  "))
    } else {
        item.to_string()
    }
}

fn render_all<T: Resource + Display>(items: &[T], dump: bool) -> String {
    items
        .iter()
        .map(|item| render(item, dump))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_query() {
        let cli = Cli::try_parse_from([
            "cupictl",
            "--server",
            "cuc",
            "list",
            "call-handlers",
            "--query",
            "(DisplayName startswith Sales)",
            "--rows",
            "5",
        ])
        .unwrap();

        match cli.command {
            Command::List {
                kind, query, rows, ..
            } => {
                assert_eq!(kind, ResourceKind::CallHandlers);
                assert_eq!(query, vec!["(DisplayName startswith Sales)".to_string()]);
                assert_eq!(rows, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bare_query_becomes_query_param() {
        let query = list_query(&["(DisplayName startswith Sales)".to_string()], 1, None);
        let url = query.to_url("https://cuc:8443/vmrest/", "handlers/callhandlers", 20);
        assert_eq!(
            url,
            "https://cuc:8443/vmrest/handlers/callhandlers\
             ?query=%28DisplayName%20startswith%20Sales%29&pageNumber=1&rowsPerPage=20"
        );
    }

    #[test]
    fn test_keyed_query_passes_through() {
        let clauses = vec![
            "query=(DtmfAccessId is 100)".to_string(),
            "sort=(DisplayName asc)".to_string(),
        ];
        let url = list_query(&clauses, 2, Some(5)).to_url(
            "https://cuc:8443/vmrest/",
            "handlers/callhandlers",
            20,
        );
        assert_eq!(
            url,
            "https://cuc:8443/vmrest/handlers/callhandlers\
             ?query=%28DtmfAccessId%20is%20100%29&sort=%28DisplayName%20asc%29\
             &pageNumber=2&rowsPerPage=5"
        );
    }

    #[test]
    fn test_rows_help_names_client_default() {
        use clap::CommandFactory;
        let command = Cli::command();
        let list = command.find_subcommand("list").unwrap();
        let rows = list
            .get_arguments()
            .find(|arg| arg.get_id() == "rows")
            .unwrap();
        let help = rows.get_help().unwrap().to_string();
        assert!(help.contains("resource or config default"));
        assert!(!help.contains("server-side"));
    }

    #[test]
    fn test_nested_kinds_need_parent() {
        assert!(ResourceKind::AlternateExtensions.parent_name().is_some());
        assert!(ResourceKind::Mwis.parent_name().is_some());
        assert!(ResourceKind::PortGroupServers.parent_name().is_some());
        assert!(ResourceKind::Tenants.parent_name().is_none());
    }

    #[test]
    fn test_connection_requires_credentials() {
        let args = ConnectionArgs {
            server: Some("cuc".to_string()),
            port: 8443,
            username: None,
            password: Some("pw".to_string()),
            timeout_secs: 30,
            accept_invalid_certs: false,
        };
        assert!(args.to_config().is_err());
    }
}
