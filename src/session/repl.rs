use super::{
    engine::{Flow, SessionEngine},
    error::SessionError,
    protocol::LineSurface,
    store::RecordStore,
};

/// Prompt shown while waiting for a command.
pub const COMMAND_PROMPT: &str = "quiz > ";

/// Reads commands from `surface` until `quit` or end of input.
///
/// Command failures are reported and never end the loop; only an I/O failure while
/// reading a command line does.
pub async fn run<S, L>(engine: &mut SessionEngine<S>, surface: &mut L) -> Result<(), SessionError>
where
    S: RecordStore,
    L: LineSurface + ?Sized,
{
    loop {
        let line = match surface.read_line(COMMAND_PROMPT).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!("command input failed: {err}");
                return Err(err.into());
            }
        };
        if engine.dispatch(surface, &line).await == Flow::Quit {
            break;
        }
    }
    tracing::debug!("session ended");
    Ok(())
}
