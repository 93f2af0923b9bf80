use tokio::sync::mpsc;

use crate::types::WorkerMsg;

/// Write-only log surface handed to pipeline stages. Lines travel over the
/// worker's ordered channel to whatever front end is consuming it; a closed
/// consumer just drops them.
#[derive(Clone)]
pub struct ProgressLog {
    tx: mpsc::UnboundedSender<WorkerMsg>,
}

impl ProgressLog {
    pub fn new(tx: mpsc::UnboundedSender<WorkerMsg>) -> Self {
        Self { tx }
    }

    pub fn line(&self, msg: impl Into<String>) {
        let _ = self.tx.send(WorkerMsg::Progress(msg.into()));
    }
}

#[cfg(test)]
pub fn test_log() -> (ProgressLog, mpsc::UnboundedReceiver<WorkerMsg>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressLog::new(tx), rx)
}
