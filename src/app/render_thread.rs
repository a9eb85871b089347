//! Drawing happens off the event loop.
//!
//! The terminal is set up on the caller's thread so failures surface from
//! `spawn`, then moved to a dedicated thread that draws the newest snapshot
//! it has been sent. Slow terminals never hold up backend results or keys.

use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::state::AppState;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// `None` asks the thread to restore the terminal and exit
type Frame = Option<Box<AppState>>;

/// Buffered snapshots; anything beyond this is dropped
const PENDING_FRAMES: usize = 2;

/// Raw mode plus alternate screen, undone on drop
struct Screen {
    terminal: Term,
}

impl Screen {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                execute!(io::stdout(), LeaveAlternateScreen).ok();
                disable_raw_mode().ok();
                Err(e)
            }
        }
    }

    fn draw(&mut self, state: &AppState) {
        if let Err(e) = self.terminal.draw(|f| crate::ui::render(f, state)) {
            tracing::error!("Render error: {}", e);
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}

pub struct RenderThread {
    frames: SyncSender<Frame>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    pub fn spawn() -> io::Result<Self> {
        let screen = Screen::enter()?;
        let (frames, rx) = mpsc::sync_channel::<Frame>(PENDING_FRAMES);

        let handle = thread::Builder::new()
            .name("sift-render".into())
            .spawn(move || draw_loop(screen, rx))?;

        Ok(Self {
            frames,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot without blocking. Dropped if the queue is full.
    pub fn render(&self, state: AppState) {
        match self.frames.try_send(Some(Box::new(state))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!("Render queue full, frame dropped"),
            Err(TrySendError::Disconnected(_)) => tracing::error!("Render thread has exited"),
        }
    }

    /// Restore the terminal and join the thread
    pub fn shutdown(mut self) {
        // Blocking send: the stop marker must not be dropped
        self.frames.send(None).ok();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("Render thread panicked");
        }
    }
}

fn draw_loop(mut screen: Screen, rx: Receiver<Frame>) {
    while let Ok(Some(mut state)) = rx.recv() {
        // Skip straight to the newest snapshot
        loop {
            match rx.try_recv() {
                Ok(Some(newer)) => state = newer,
                Ok(None) | Err(TryRecvError::Disconnected) => {
                    screen.draw(&state);
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        screen.draw(&state);
    }
}
