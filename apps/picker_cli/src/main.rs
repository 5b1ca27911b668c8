use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pc_picker::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    control::{EQUIPMENT_CONTROL_ID, ROOM_CONTROL_ID},
    DropdownSynchronizer, EquipmentControl, HttpPcSource, OptionEntry, PcSource, SelectControl,
    SyncOutcome,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Fill the equipment dropdown of a reservation form from the server")]
struct Cli {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides `server_url` from the settings file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Session cookie of an admin login, sent with every request.
    #[arg(long)]
    cookie: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select one room and print the resulting equipment options.
    Fetch {
        #[arg(long)]
        room: String,
    },
    /// Treat every stdin line as a new room selection.
    Watch,
}

/// Equipment control that echoes every re-render to stdout.
#[derive(Clone)]
struct PrintedSelect {
    inner: SelectControl,
}

impl EquipmentControl for PrintedSelect {
    fn replace_options(&self, entries: Vec<OptionEntry>) {
        println!("{EQUIPMENT_CONTROL_ID}:");
        for entry in &entries {
            match &entry.value {
                Some(value) => println!("  {value}\t{}", entry.label),
                None => println!("  -\t{} (disabled)", entry.label),
            }
        }
        self.inner.replace_options(entries);
    }

    fn options(&self) -> Vec<OptionEntry> {
        self.inner.options()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picker_cli=info,pc_picker=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config);
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(cookie) = cli.cookie {
        settings.cookie = Some(cookie);
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }

    let source = HttpPcSource::from_settings(&settings)
        .with_context(|| format!("failed to set up client for {}", settings.server_url))?;
    tracing::info!(server_url = source.server_url(), "using reservation server");

    let room = SelectControl::new(ROOM_CONTROL_ID);
    let equipment = PrintedSelect {
        inner: SelectControl::new(EQUIPMENT_CONTROL_ID),
    };
    let sync = Arc::new(DropdownSynchronizer::new(source, room.clone(), equipment));

    match cli.command {
        Command::Fetch { room: room_id } => {
            room.set_value(room_id);
            report(sync.on_room_changed().await);
        }
        Command::Watch => {
            let stdin = BufReader::new(tokio::io::stdin());
            watch_rooms(sync, &room, stdin, report).await?;
        }
    }

    Ok(())
}

/// Treats each input line as a room selection. Outcomes are reported as
/// changes settle, not when the input ends.
async fn watch_rooms<S, E, I>(
    sync: Arc<DropdownSynchronizer<S, SelectControl, E>>,
    room: &SelectControl,
    input: I,
    mut on_settled: impl FnMut(SyncOutcome),
) -> Result<()>
where
    S: PcSource + 'static,
    E: EquipmentControl + 'static,
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut inflight = JoinSet::new();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                // `lines` strips the terminator only; empty values go to the server too.
                room.set_value(line);
                let pending = sync.begin_change();
                let sync = Arc::clone(&sync);
                inflight.spawn(async move { sync.complete_change(pending).await });
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                on_settled(joined.context("room change task failed")?);
            }
        }
    }

    while let Some(joined) = inflight.join_next().await {
        on_settled(joined.context("room change task failed")?);
    }
    Ok(())
}

fn report(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Rendered(kind) => tracing::debug!(rendered = ?kind, "room change settled"),
        SyncOutcome::Superseded { sequence, latest } => {
            tracing::info!(sequence, latest, "skipped stale response")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use pc_picker::{render::RenderedKind, FetchError};
    use shared::{
        domain::RoomId,
        error::ServerRejection,
        protocol::{available_pcs_path, PcOption},
    };
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSource {
        rooms: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PcSource for RecordingSource {
        async fn fetch_available_pcs(
            &self,
            room_id: &RoomId,
        ) -> Result<Vec<PcOption>, FetchError> {
            self.rooms.lock().await.push(room_id.to_string());
            if room_id.as_str().is_empty() {
                return Err(ServerRejection::new(404, available_pcs_path("")).into());
            }
            Ok(vec![PcOption::new(1, "PC-A")])
        }
    }

    #[tokio::test]
    async fn watch_forwards_every_line_verbatim() {
        let source = Arc::new(RecordingSource::default());
        let room = SelectControl::new(ROOM_CONTROL_ID);
        let sync = Arc::new(DropdownSynchronizer::new(
            Arc::clone(&source),
            room.clone(),
            SelectControl::new(EQUIPMENT_CONTROL_ID),
        ));

        let mut settled = Vec::new();
        watch_rooms(sync, &room, &b"1\n\n 2\n"[..], |outcome| settled.push(outcome))
            .await
            .expect("watch");

        let mut rooms = source.rooms.lock().await.clone();
        rooms.sort();
        assert_eq!(rooms, vec!["", " 2", "1"]);
        assert_eq!(settled.len(), 3);
    }

    #[tokio::test]
    async fn watch_reports_before_input_ends() {
        let source = Arc::new(RecordingSource::default());
        let room = SelectControl::new(ROOM_CONTROL_ID);
        let sync = Arc::new(DropdownSynchronizer::new(
            Arc::clone(&source),
            room.clone(),
            SelectControl::new(EQUIPMENT_CONTROL_ID),
        ));
        let (mut writer, reader) = tokio::io::duplex(64);
        let (settled_tx, mut settled_rx) = tokio::sync::mpsc::unbounded_channel();

        let watcher = tokio::spawn(async move {
            watch_rooms(sync, &room, BufReader::new(reader), |outcome| {
                let _ = settled_tx.send(outcome);
            })
            .await
        });

        tokio::io::AsyncWriteExt::write_all(&mut writer, b"1\n")
            .await
            .expect("write");
        let first = tokio::time::timeout(std::time::Duration::from_secs(2), settled_rx.recv())
            .await
            .expect("reported while input is open")
            .expect("outcome");
        assert_eq!(
            first,
            SyncOutcome::Rendered(RenderedKind::Populated { count: 1 })
        );

        drop(writer);
        watcher.await.expect("join").expect("watch");
    }
}
