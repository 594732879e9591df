#![expect(clippy::print_stdout)]

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use chat_admin_client::{AdminClientConfig, HttpAdminTransport};
use chat_admin_core::view::ModeOption;
use chat_admin_core::{
    ChatId, ChatSelection, ModeSelection, MutationOutcome, PageView, PermissionField,
    PermissionsPage, PermissionsView, ResourceCache, SchemePage, SchemeView, TracingNotifier,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "chat-admin")]
#[command(about = "Inspect and edit chat admin permissions and verification schemes")]
pub struct ChatAdminCli {
    /// Admin API base URL (overrides CHAT_ADMIN_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Request timeout in milliseconds (overrides CHAT_ADMIN_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-user admin permissions of a chat
    #[command(subcommand)]
    Permissions(PermissionsCommand),
    /// Verification scheme of a chat
    #[command(subcommand)]
    Scheme(SchemeCommand),
}

#[derive(Subcommand)]
pub enum PermissionsCommand {
    List(ChatArgs),
    Set(SetPermissionArgs),
    Withdraw(RowArgs),
}

#[derive(Subcommand)]
pub enum SchemeCommand {
    Show(ChatArgs),
    Set(SetSchemeArgs),
}

#[derive(Args)]
pub struct ChatArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub chat: i64,
}

#[derive(Args)]
pub struct RowArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub chat: i64,
    /// Zero-based row in the permissions table
    #[arg(long)]
    pub index: usize,
}

#[derive(Args)]
pub struct SetPermissionArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub chat: i64,
    #[arg(long)]
    pub index: usize,
    #[arg(long, value_enum)]
    pub field: FieldArg,
    #[arg(long, action = clap::ArgAction::Set)]
    pub value: bool,
}

#[derive(Args)]
pub struct SetSchemeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub chat: i64,
    /// image, custom, arithmetic, initiative or default
    #[arg(long)]
    pub mode: ModeSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    Readable,
    Writable,
    KeptInSync,
}

pub fn run() -> Result<()> {
    let cli = ChatAdminCli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(execute(cli))
}

fn client_config(cli: &ChatAdminCli) -> AdminClientConfig {
    let mut config = AdminClientConfig::from_env();
    if let Some(base_url) = cli.base_url.as_deref() {
        config.base_url = base_url.to_string();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config
}

async fn execute(cli: ChatAdminCli) -> Result<()> {
    let transport = HttpAdminTransport::new(client_config(&cli))
        .context("failed to build admin transport")?;
    tracing::debug!(base_url = transport.base_url(), "admin transport ready");
    let cache = Rc::new(ResourceCache::new(transport));

    match cli.command {
        Commands::Permissions(command) => {
            run_permissions(PermissionsPage::new(cache, TracingNotifier), command).await
        }
        Commands::Scheme(command) => {
            run_scheme(SchemePage::new(cache, TracingNotifier), command).await
        }
    }
}

async fn run_permissions(
    page: PermissionsPage<HttpAdminTransport, TracingNotifier>,
    command: PermissionsCommand,
) -> Result<()> {
    let chat = match &command {
        PermissionsCommand::List(args) => args.chat,
        PermissionsCommand::Set(args) => args.chat,
        PermissionsCommand::Withdraw(args) => args.chat,
    };
    page.sync(&ChatSelection::loaded(ChatId(chat)))
        .await
        .with_context(|| format!("failed to load permissions of chat {chat}"))?;

    let outcome = match command {
        PermissionsCommand::List(_) => None,
        PermissionsCommand::Set(args) => {
            let outcome = match args.field {
                FieldArg::Readable => {
                    page.toggle_field(PermissionField::Readable, args.index, args.value)
                        .await
                }
                FieldArg::Writable => {
                    page.toggle_field(PermissionField::Writable, args.index, args.value)
                        .await
                }
                FieldArg::KeptInSync => page.toggle_kept_in_sync(args.index, args.value).await,
            };
            Some(outcome.with_context(|| format!("failed to update row {}", args.index))?)
        }
        PermissionsCommand::Withdraw(args) => Some(
            page.withdraw(args.index)
                .await
                .with_context(|| format!("failed to withdraw row {}", args.index))?,
        ),
    };
    if outcome == Some(MutationOutcome::Ignored) {
        println!("record is no longer listed; server change not mirrored locally");
    }

    match page.view() {
        PageView::Loaded(view) => {
            for line in render_permissions(&view) {
                println!("{line}");
            }
            Ok(())
        }
        PageView::Loading => bail!("permissions of chat {chat} are not loaded"),
        PageView::Reloading => bail!("permissions of chat {chat} failed to load"),
    }
}

async fn run_scheme(
    page: SchemePage<HttpAdminTransport, TracingNotifier>,
    command: SchemeCommand,
) -> Result<()> {
    let chat = match &command {
        SchemeCommand::Show(args) => args.chat,
        SchemeCommand::Set(args) => args.chat,
    };
    page.sync(&ChatSelection::loaded(ChatId(chat)))
        .await
        .with_context(|| format!("failed to load scheme of chat {chat}"))?;

    if let SchemeCommand::Set(args) = command {
        page.select(args.mode);
        page.confirm()
            .await
            .with_context(|| format!("failed to save scheme of chat {chat}"))?;
    }

    match page.view() {
        PageView::Loaded(view) => {
            for line in render_scheme(&view) {
                println!("{line}");
            }
            Ok(())
        }
        PageView::Loading => bail!("scheme of chat {chat} is not loaded"),
        PageView::Reloading => bail!("scheme of chat {chat} failed to load"),
    }
}

fn switch(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

pub fn render_permissions(view: &PermissionsView) -> Vec<String> {
    let mut lines = vec![view.title.clone(), format!("[{}]", view.section)];
    if view.rows.is_empty() {
        lines.push("  (no permissions)".to_string());
    }
    for (index, row) in view.rows.iter().enumerate() {
        let actions = row
            .actions
            .iter()
            .map(|action| action.label())
            .collect::<Vec<_>>()
            .join("/");
        lines.push(format!(
            "  {index}. {} readable={} writable={} kept_in_sync={} [{actions}]",
            row.display_name,
            switch(row.readable),
            switch(row.writable),
            switch(row.kept_in_sync),
        ));
    }
    lines
}

fn render_option(option: &ModeOption) -> String {
    let marker = if option.selected { '*' } else { ' ' };
    format!("  {marker} {} {}", option.value, option.label)
}

pub fn render_scheme(view: &SchemeView) -> Vec<String> {
    let mut lines = vec![view.title.clone(), format!("[{}]", view.section)];
    lines.extend(view.mode_options.iter().map(render_option));
    for section in view.placeholder_sections {
        lines.push(format!("[{section}]"));
    }
    lines
}
