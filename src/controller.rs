// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{debug, error, info, span, Instrument, Level};

use crate::cancel::CancelHandle;
use crate::capture::{CaptureBoard, StartFlag};
use crate::note::Note;
use crate::receiver::Receiver;
use crate::sampler::SharedLatch;

pub mod keyboard;

/// Controller events that drive the capture board.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Starts recording a song. Ignored while a song is being recorded.
    Start,

    /// A note button was pressed.
    Press(Note),

    /// Shuts the boards down.
    Quit,
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Feeds input from a driver into the capture board.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver. The latch must be the one the
    /// board's sampler reads from. If a receiver is given, it runs alongside the
    /// capture board until the controller exits.
    pub fn new(
        board: CaptureBoard,
        latch: Arc<SharedLatch>,
        receiver: Option<Receiver>,
        driver: Arc<dyn Driver>,
    ) -> Result<Controller, Box<dyn Error>> {
        Ok(Controller {
            handle: tokio::spawn(
                Controller::trigger_events(board, latch, receiver, driver)
                    .instrument(span!(Level::INFO, "controller")),
            ),
        })
    }

    /// Join will block until the controller finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Runs the boards and forwards driver events to them.
    async fn trigger_events(
        mut board: CaptureBoard,
        latch: Arc<SharedLatch>,
        receiver: Option<Receiver>,
        driver: Arc<dyn Driver>,
    ) {
        let start = Arc::new(StartFlag::new());
        let cancel_handle = CancelHandle::new();

        let board_handle = {
            let start = start.clone();
            let cancel_handle = cancel_handle.clone();
            tokio::task::spawn_blocking(move || board.run(start.as_ref(), &cancel_handle))
        };
        let receiver_handle = receiver.map(|mut receiver| {
            let cancel_handle = cancel_handle.clone();
            tokio::task::spawn_blocking(move || receiver.run(&cancel_handle))
        });

        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!("Controller started.");

        while let Some(event) = events_rx.recv().await {
            debug!(event = format!("{:?}", event), "Received event.");

            match event {
                Event::Start => start.press(),
                Event::Press(note) => {
                    if latch.on_edge(note.bit()) {
                        continue;
                    }
                    if latch.is_open() {
                        debug!(note = %note, "Another note was already played in this window.");
                    } else {
                        debug!(note = %note, "Press outside of a sampling window.");
                    }
                }
                Event::Quit => break,
            }
        }

        info!("Controller closing.");
        drop(events_rx);
        cancel_handle.cancel();
        if let Err(e) = board_handle.await {
            error!("Error waiting for capture board to stop: {}", e);
        }
        if let Some(receiver_handle) = receiver_handle {
            match receiver_handle.await {
                Ok(Err(e)) => error!("Receiver failed: {}", e),
                Err(e) => error!("Error waiting for receiver to stop: {}", e),
                Ok(Ok(())) => {}
            }
        }
        if let Err(e) = join_handle.await {
            error!("Error waiting for event monitor to stop: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use std::{
        error::Error,
        io,
        sync::{mpsc as std_mpsc, Arc, Mutex},
        time::Duration,
    };

    use tokio::{
        sync::mpsc::{self, Sender, UnboundedReceiver, UnboundedSender},
        task::JoinHandle,
    };

    use super::{Controller, Driver, Event};
    use crate::{
        capture::CaptureBoard,
        link::loopback,
        note::Note,
        receiver::{OutputConfig, Receiver},
        recorder::SongRecorder,
        sampler::{Sampler, SharedLatch, WindowTimer},
        songs::Songs,
        testutil::{eventually, MockOutputStage, RecordingFeedback, RecordingLink},
    };

    /// A driver that forwards whatever the test sends it.
    struct TestDriver {
        events: Mutex<Option<UnboundedReceiver<Event>>>,
    }

    impl TestDriver {
        fn new() -> (Arc<TestDriver>, UnboundedSender<Event>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(TestDriver {
                    events: Mutex::new(Some(rx)),
                }),
                tx,
            )
        }
    }

    impl Driver for TestDriver {
        fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
            let mut events = self
                .events
                .lock()
                .expect("failed to get lock")
                .take()
                .expect("already monitoring");
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    let quit = event == Event::Quit;
                    if events_tx.send(event).await.is_err() || quit {
                        break;
                    }
                }
                Ok(())
            })
        }
    }

    /// A window timer that stays open until the test closes it.
    struct StepTimer {
        close_rx: std_mpsc::Receiver<()>,
    }

    impl WindowTimer for StepTimer {
        fn wait_window(&mut self) {
            let _ = self.close_rx.recv_timeout(Duration::from_secs(5));
        }
    }

    fn board(
        latch: Arc<SharedLatch>,
        link: Box<dyn crate::link::ResultSink>,
    ) -> (CaptureBoard, std_mpsc::Sender<()>) {
        let (close_tx, close_rx) = std_mpsc::channel();
        let board = CaptureBoard::new(
            Sampler::new(latch, Box::new(StepTimer { close_rx })),
            SongRecorder::default(),
            Arc::new(Songs::default()),
            Box::new(RecordingFeedback::new()),
            link,
            Duration::from_millis(1),
        );
        (board, close_tx)
    }

    fn play(
        latch: &SharedLatch,
        events: &UnboundedSender<Event>,
        close_tx: &std_mpsc::Sender<()>,
        notes: &[Note],
    ) {
        for note in notes {
            eventually(|| latch.is_open(), "Sampling window never opened");
            events
                .send(Event::Press(*note))
                .expect("unable to send press");
            eventually(|| latch.latched() == note.bit(), "Press never latched");
            close_tx.send(()).expect("unable to close window");
            eventually(|| latch.latched() == 0, "Window never closed");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_controller() -> Result<(), Box<dyn Error>> {
        let latch = Arc::new(SharedLatch::new());
        let link = RecordingLink::new();
        let (board, close_tx) = board(latch.clone(), Box::new(link.clone()));
        let (driver, events) = TestDriver::new();
        let mut controller = Controller::new(board, latch.clone(), None, driver)?;

        events.send(Event::Start)?;
        play(
            &latch,
            &events,
            &close_tx,
            &[Note::A, Note::Down, Note::Up, Note::A, Note::Down, Note::Up],
        );
        eventually(|| link.sent() == vec![0xFF], "Song code was never sent");

        events.send(Event::Quit)?;
        assert!(controller.join().await.is_ok(), "Error waiting for controller");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_presses_before_start_are_dropped() -> Result<(), Box<dyn Error>> {
        let latch = Arc::new(SharedLatch::new());
        let link = RecordingLink::new();
        let (board, close_tx) = board(latch.clone(), Box::new(link.clone()));
        let (driver, events) = TestDriver::new();
        let mut controller = Controller::new(board, latch.clone(), None, driver)?;

        // Events are handled in order, so this press is seen before the board starts.
        events.send(Event::Press(Note::A))?;
        events.send(Event::Start)?;

        eventually(|| latch.is_open(), "Sampling window never opened");
        assert_eq!(0, latch.latched());

        // An early A leaking into the first window would keep Right from latching.
        play(
            &latch,
            &events,
            &close_tx,
            &[
                Note::Right,
                Note::Down,
                Note::Up,
                Note::Right,
                Note::Down,
                Note::Up,
            ],
        );
        eventually(|| link.sent() == vec![0x11], "Song code was never sent");

        events.send(Event::Quit)?;
        assert!(controller.join().await.is_ok(), "Error waiting for controller");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_controller_with_receiver() -> Result<(), Box<dyn Error>> {
        let latch = Arc::new(SharedLatch::new());
        let (link, source) = loopback();
        let output = MockOutputStage::new();
        let receiver = Receiver::new(Box::new(source), Box::new(output.clone()));
        let (board, close_tx) = board(latch.clone(), Box::new(link));
        let (driver, events) = TestDriver::new();
        let mut controller = Controller::new(board, latch.clone(), Some(receiver), driver)?;

        events.send(Event::Start)?;
        play(
            &latch,
            &events,
            &close_tx,
            &[
                Note::Right,
                Note::Down,
                Note::Up,
                Note::Right,
                Note::Down,
                Note::Up,
            ],
        );
        eventually(
            || output.applied() == vec![OutputConfig::Sun],
            "Receiver never switched to the sun configuration",
        );

        events.send(Event::Quit)?;
        assert!(controller.join().await.is_ok(), "Error waiting for controller");
        Ok(())
    }
}
