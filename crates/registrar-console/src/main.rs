use anyhow::Context;
use registrar_console::cli::{Action, Invocation};
use registrar_sync::{ConsoleConfig, Session};

fn load_config(invocation: &Invocation) -> anyhow::Result<ConsoleConfig> {
    let config = match &invocation.config_path {
        Some(path) => ConsoleConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConsoleConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = &invocation.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(cookie) = &invocation.session {
        config = config.with_session_cookie(cookie.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn execute(invocation: Invocation) -> anyhow::Result<()> {
    let config = load_config(&invocation)?;
    tracing::debug!(base_url = %config.base_url, "connecting");
    let session = Session::connect(config).context("building HTTP client")?;

    let mut stdout = std::io::stdout().lock();
    match invocation.action {
        Action::Notifications { watch: true } => {
            let shutdown = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %err, "could not listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            };
            registrar_console::watch_notifications(&session, &mut stdout, shutdown).await
        }
        action => registrar_console::run(&session, action, &mut stdout).await,
    }
}

#[tokio::main]
async fn main() {
    let matches = registrar_console::command().get_matches();
    let invocation = match registrar_console::parse(&matches) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };
    registrar_console::init_tracing(invocation.log_json);

    if let Err(err) = execute(invocation).await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
