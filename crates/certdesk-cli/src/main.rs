//! certdesk CLI - browse and manage certificates from the terminal.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use certdesk_core::{
    Certificate, CertificateId, CertificateKind, CertificateStatus, CustomerId, Filter, OwnerId,
    SortKey,
};
use certdesk_list::{ListConfig, ListController, Notification, NotificationKind};
use certdesk_store::{
    CertificateExporter, CertificateStore, HttpStore, HttpStoreConfig, MemoryStore,
};

/// Certificates generated for `--demo`.
const DEMO_CERTIFICATES: usize = 45;

/// certdesk CLI - certificate list management tool
#[derive(Parser)]
#[command(name = "certdesk")]
#[command(about = "Browse and manage electrical certificates", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Owner whose certificates to work with
    #[arg(short, long)]
    owner: Option<String>,

    /// Bearer token for the API
    #[arg(long)]
    token: Option<String>,

    /// Certificates requested per page
    #[arg(long, default_value_t = 20)]
    page_size: u32,

    /// Log requests and state changes to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Use generated in-memory certificates instead of the API
    #[arg(long)]
    demo: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List certificates
    List {
        /// Match against number, client name or address
        #[arg(short, long)]
        search: Option<String>,

        /// Only show this status (draft, in-progress, completed)
        #[arg(long)]
        status: Option<CertificateStatus>,

        /// Only show this kind (eicr, eic, minor-works)
        #[arg(long)]
        kind: Option<CertificateKind>,

        /// Sort order (newest, oldest, id, id-desc, name, name-desc, status)
        #[arg(long, default_value = "newest")]
        sort: SortKey,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Delete a certificate
    Delete {
        /// Certificate number
        id: String,
    },

    /// Delete several certificates
    #[command(name = "bulk-delete")]
    BulkDelete {
        /// Certificate numbers
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Change the status of several certificates
    #[command(name = "set-status")]
    SetStatus {
        /// New status
        status: CertificateStatus,

        /// Certificate numbers
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Link a certificate to a customer, or unlink it
    Link {
        /// Certificate number
        id: String,

        /// Customer to link; omit to unlink
        #[arg(short, long)]
        customer: Option<String>,
    },

    /// Export several certificates
    Export {
        /// Certificate numbers
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let owner = match (&cli.owner, cli.demo) {
        (Some(owner), _) => OwnerId::new(owner.as_str()),
        (None, true) => OwnerId::new("demo"),
        (None, false) => return Err("--owner is required unless --demo is set".into()),
    };

    let (store, exporter): (Arc<dyn CertificateStore>, Arc<dyn CertificateExporter>) = if cli.demo {
        let memory = Arc::new(MemoryStore::seeded(&owner, DEMO_CERTIFICATES));
        (memory.clone(), memory)
    } else {
        let http = Arc::new(HttpStore::new(HttpStoreConfig {
            base_url: cli.url.clone(),
            token: cli.token.clone(),
            ..Default::default()
        })?);
        (http.clone(), http)
    };

    debug!(owner = %owner, demo = cli.demo, "Starting certdesk");

    let config = ListConfig::default().with_page_size(cli.page_size);
    let controller = ListController::new(store, exporter, owner, config);
    controller.refresh().await?;

    let notification = match cli.command {
        Commands::List {
            search,
            status,
            kind,
            sort,
            pages,
        } => {
            list(&controller, search, status, kind, sort, pages, cli.json).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Delete { id } => {
            controller.request_delete(id);
            controller.confirm_delete().await
        }
        Commands::BulkDelete { ids } => {
            select(&controller, ids);
            controller.request_bulk_delete();
            controller.confirm_bulk_delete().await
        }
        Commands::SetStatus { status, ids } => {
            // Status changes only apply to loaded certificates.
            while controller.load_next_page().await? {}
            select(&controller, ids);
            controller.bulk_set_status(status).await
        }
        Commands::Link { id, customer } => {
            controller
                .link_entity(id, customer.map(CustomerId::from))
                .await
        }
        Commands::Export { ids } => {
            select(&controller, ids);
            controller.bulk_export().await
        }
    };

    match notification {
        Some(notification) => {
            print_notification(&notification, cli.json)?;
            if notification.kind == NotificationKind::Failure {
                return Ok(ExitCode::FAILURE);
            }
        }
        None => {
            eprintln!("Nothing to do: none of the given certificates are loaded");
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn select(controller: &ListController, ids: Vec<String>) {
    controller.enter_bulk_mode();
    for id in ids {
        controller.toggle_select(CertificateId::from(id));
    }
}

async fn list(
    controller: &ListController,
    search: Option<String>,
    status: Option<CertificateStatus>,
    kind: Option<CertificateKind>,
    sort: SortKey,
    pages: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 1..pages {
        if !controller.load_next_page().await? {
            break;
        }
    }

    controller.set_search(search.unwrap_or_default());
    controller.set_status_filter(Filter::from(status));
    controller.set_type_filter(Filter::from(kind));
    controller.set_sort(sort);

    let view = controller.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{:<16}  {:<11}  {:<11}  {:<24}  {}",
        "NUMBER", "KIND", "STATUS", "CLIENT", "UPDATED"
    );
    println!("{}", "-".repeat(84));

    for certificate in &view {
        print_row(certificate);
    }

    println!();
    println!(
        "Showing {} of {} loaded ({} total)",
        view.len(),
        controller.collection().len(),
        controller.total_count()
    );
    if controller.has_more() {
        println!("More available: use --pages {}", controller.page() + 1);
    }

    let counts = controller.status_counts();
    println!(
        "Draft: {}  In progress: {}  Completed: {}",
        counts.draft, counts.in_progress, counts.completed
    );

    Ok(())
}

fn print_row(certificate: &Certificate) {
    let client = certificate.client_name.as_deref().unwrap_or("-");
    println!(
        "{:<16}  {:<11}  {:<11}  {:<24}  {}",
        certificate.id.as_str(),
        certificate.kind.label(),
        certificate.status.label(),
        truncate(client, 24),
        certificate.updated_at.format("%Y-%m-%d %H:%M")
    );
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('~');
        out
    }
}

fn print_notification(
    notification: &Notification,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(notification)?);
        return Ok(());
    }

    let prefix = match notification.kind {
        NotificationKind::Success => "OK",
        NotificationKind::Partial => "PARTIAL",
        NotificationKind::Failure => "FAILED",
    };
    println!("{}: {}", prefix, notification.message);
    Ok(())
}
