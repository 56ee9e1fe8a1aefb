use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::export::export_workbook;
use crate::fetch::LeagueSource;
use crate::state::{Delta, ProviderCommand};

/// Runs `source` on a worker thread. Commands are handled one at a time, so
/// at most one analysis request is ever in flight. The thread exits when the
/// command channel closes.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    mut source: Box<dyn LeagueSource>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::Analyze {
                    request_id,
                    league_id,
                } => {
                    let delta = run_analysis(source.as_mut(), request_id, &league_id);
                    if tx.send(delta).is_err() {
                        break;
                    }
                }
                ProviderCommand::Export { path, data } => {
                    let tx = tx.clone();
                    thread::spawn(move || {
                        let path_display = path.display().to_string();
                        let delta = match export_workbook(&path, &data) {
                            Ok(report) => Delta::ExportFinished {
                                path: path_display.clone(),
                                managers: report.managers,
                                weeks: report.weeks,
                                improvements: report.improvements,
                            },
                            Err(err) => Delta::ExportFailed {
                                path: path_display.clone(),
                                error: format!("{err:#}"),
                            },
                        };
                        if tx.send(delta).is_err() {
                            debug!(path = %path_display, "export finished after the dashboard closed");
                        }
                    });
                }
            }
        }
    })
}

pub fn run_analysis(source: &mut dyn LeagueSource, request_id: u64, league_id: &str) -> Delta {
    info!(request_id, league_id, source = source.label(), "analysis started");
    match source.analyze(league_id) {
        Ok(data) => {
            info!(request_id, managers = data.manager_analytics.len(), "analysis loaded");
            Delta::AnalysisLoaded {
                request_id,
                data: Box::new(data),
            }
        }
        Err(err) => {
            warn!(request_id, error = %err, "analysis failed");
            Delta::AnalysisFailed {
                request_id,
                message: err.user_message().to_string(),
                error: err.to_string(),
            }
        }
    }
}
