use tokio::{
    signal::unix::{SignalKind, signal},
    task::JoinHandle,
};

use super::sync::SyncCommandSender;
use crate::domain::entities::sync::SyncTrigger;

/// Forwards every `SIGUSR1` to the sync worker as a new run request
pub fn listen(command_tx: SyncCommandSender) -> Result<JoinHandle<()>, std::io::Error> {
    let mut usr1 = signal(SignalKind::user_defined1())?;

    Ok(tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            info!("received SIGUSR1");
            if command_tx.send_async(SyncTrigger::Signal).await.is_err() {
                error!("sync worker is gone, stop listening for signals");
                break;
            }
        }
    }))
}
