use crate::core::error::PlaybackError;
use crate::utils::audio::AudioBuffer;
use log::{debug, info};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

/// A started playback of one buffer. Stopping consumes the handle.
pub trait PlaybackSource {
    fn is_finished(&self) -> bool;
    fn stop(self: Box<Self>);
}

/// Platform audio output that playback sources are connected to.
pub trait AudioOutput {
    fn is_suspended(&self) -> bool;
    fn resume(&mut self) -> Result<(), PlaybackError>;
    /// Starts `buffer` from the beginning on a fresh source.
    fn start(&mut self, buffer: &AudioBuffer) -> Result<Box<dyn PlaybackSource>, PlaybackError>;
}

impl<T: AudioOutput + ?Sized> AudioOutput for &mut T {
    fn is_suspended(&self) -> bool {
        (**self).is_suspended()
    }

    fn resume(&mut self) -> Result<(), PlaybackError> {
        (**self).resume()
    }

    fn start(&mut self, buffer: &AudioBuffer) -> Result<Box<dyn PlaybackSource>, PlaybackError> {
        (**self).start(buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Plays at most one buffer at a time on an output.
///
/// Dropping the controller stops whatever is still playing.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    active: Option<Box<dyn PlaybackSource>>,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            active: None,
        }
    }

    /// Plays `buffer` from the start, replacing any current playback.
    pub fn play(&mut self, buffer: &AudioBuffer) -> Result<(), PlaybackError> {
        self.stop();

        if self.output.is_suspended() {
            debug!("Resuming audio output");
            self.output.resume()?;
        }

        let source = self.output.start(buffer)?;
        info!(
            "Playing narration ({:.1}s)",
            buffer.duration().as_secs_f32()
        );
        self.active = Some(source);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(source) = self.active.take() {
            debug!("Stopping playback");
            source.stop();
        }
    }

    /// Current state. A source that played to its end is released here.
    ///
    /// Outputs report completion only through polling, so this is where a
    /// naturally finished narration turns into `Stopped`.
    pub fn state(&mut self) -> PlaybackState {
        if self.active.as_ref().is_some_and(|s| s.is_finished()) {
            debug!("Playback finished");
            self.stop();
        }
        if self.active.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_playing(&mut self) -> bool {
        self.state() == PlaybackState::Playing
    }
}

impl<O: AudioOutput> Drop for PlaybackController<O> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Default output device through rodio.
///
/// The device stream is opened on the first `resume`; until then the output
/// counts as suspended.
#[derive(Default)]
pub struct RodioOutput {
    stream: Option<OutputStream>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for RodioOutput {
    fn is_suspended(&self) -> bool {
        self.stream.is_none()
    }

    fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        Ok(())
    }

    fn start(&mut self, buffer: &AudioBuffer) -> Result<Box<dyn PlaybackSource>, PlaybackError> {
        // rodio asserts on a zero rate
        if buffer.sample_rate() == 0 {
            return Err(PlaybackError::Start("sample rate is 0 Hz".to_string()));
        }
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| PlaybackError::Start("audio output is suspended".to_string()))?;

        let sink = Sink::connect_new(stream.mixer());
        sink.append(SamplesBuffer::new(
            buffer.channels(),
            buffer.sample_rate(),
            buffer.samples().to_vec(),
        ));
        sink.play();
        Ok(Box::new(SinkSource { sink }))
    }
}

struct SinkSource {
    sink: Sink,
}

impl PlaybackSource for SinkSource {
    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(self: Box<Self>) {
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Shared bookkeeping of a fake output, inspected by the tests.
    #[derive(Default)]
    struct Ledger {
        started: Cell<usize>,
        stopped: Cell<usize>,
        resumed: Cell<usize>,
        finished: RefCell<Vec<Rc<Cell<bool>>>>,
    }

    impl Ledger {
        fn active(&self) -> usize {
            self.started.get() - self.stopped.get()
        }

        fn finish_all(&self) {
            for flag in self.finished.borrow().iter() {
                flag.set(true);
            }
        }
    }

    struct FakeSource {
        ledger: Rc<Ledger>,
        finished: Rc<Cell<bool>>,
    }

    impl PlaybackSource for FakeSource {
        fn is_finished(&self) -> bool {
            self.finished.get()
        }

        fn stop(self: Box<Self>) {
            self.ledger.stopped.set(self.ledger.stopped.get() + 1);
        }
    }

    struct FakeOutput {
        suspended: bool,
        resume_fails: bool,
        ledger: Rc<Ledger>,
    }

    impl FakeOutput {
        fn new() -> (Self, Rc<Ledger>) {
            let ledger = Rc::new(Ledger::default());
            (
                Self {
                    suspended: true,
                    resume_fails: false,
                    ledger: ledger.clone(),
                },
                ledger,
            )
        }
    }

    impl AudioOutput for FakeOutput {
        fn is_suspended(&self) -> bool {
            self.suspended
        }

        fn resume(&mut self) -> Result<(), PlaybackError> {
            if self.resume_fails {
                return Err(PlaybackError::OutputUnavailable("no device".to_string()));
            }
            self.ledger.resumed.set(self.ledger.resumed.get() + 1);
            self.suspended = false;
            Ok(())
        }

        fn start(
            &mut self,
            _buffer: &AudioBuffer,
        ) -> Result<Box<dyn PlaybackSource>, PlaybackError> {
            let finished = Rc::new(Cell::new(false));
            self.ledger.finished.borrow_mut().push(finished.clone());
            self.ledger.started.set(self.ledger.started.get() + 1);
            Ok(Box::new(FakeSource {
                ledger: self.ledger.clone(),
                finished,
            }))
        }
    }

    fn buffer() -> AudioBuffer {
        AudioBuffer::new(vec![0.0, 0.5, -0.5], 24_000)
    }

    #[test]
    fn test_play_resumes_suspended_output_once() {
        let (output, ledger) = FakeOutput::new();
        let mut controller = PlaybackController::new(output);

        controller.play(&buffer()).unwrap();
        assert!(controller.is_playing());
        assert_eq!(ledger.resumed.get(), 1);

        controller.play(&buffer()).unwrap();
        assert_eq!(ledger.resumed.get(), 1);
    }

    #[test]
    fn test_second_play_replaces_first_source() {
        let (output, ledger) = FakeOutput::new();
        let mut controller = PlaybackController::new(output);

        controller.play(&buffer()).unwrap();
        controller.play(&buffer()).unwrap();

        assert_eq!(ledger.started.get(), 2);
        assert_eq!(ledger.stopped.get(), 1);
        assert_eq!(ledger.active(), 1);
        assert_eq!(controller.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let (output, ledger) = FakeOutput::new();
        let mut controller = PlaybackController::new(output);

        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Stopped);

        controller.play(&buffer()).unwrap();
        controller.stop();
        controller.stop();
        assert_eq!(ledger.stopped.get(), 1);
        assert_eq!(controller.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_natural_completion_releases_source() {
        let (output, ledger) = FakeOutput::new();
        let mut controller = PlaybackController::new(output);

        controller.play(&buffer()).unwrap();
        ledger.finish_all();

        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(ledger.active(), 0);

        // Replay starts a new source from the beginning.
        controller.play(&buffer()).unwrap();
        assert_eq!(ledger.started.get(), 2);
        assert_eq!(ledger.active(), 1);
    }

    #[test]
    fn test_resume_failure_leaves_controller_stopped() {
        let (mut output, ledger) = FakeOutput::new();
        output.resume_fails = true;
        let mut controller = PlaybackController::new(output);

        let err = controller.play(&buffer()).unwrap_err();
        assert!(matches!(err, PlaybackError::OutputUnavailable(_)));
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(ledger.started.get(), 0);
    }

    #[test]
    fn test_drop_stops_active_playback() {
        let (output, ledger) = FakeOutput::new();
        {
            let mut controller = PlaybackController::new(output);
            controller.play(&buffer()).unwrap();
            assert_eq!(ledger.active(), 1);
        }
        assert_eq!(ledger.active(), 0);
    }

    #[test]
    fn test_borrowed_output_outlives_controller() {
        let (mut output, ledger) = FakeOutput::new();
        {
            let mut controller = PlaybackController::new(&mut output);
            controller.play(&buffer()).unwrap();
        }
        assert_eq!(ledger.active(), 0);
        assert!(!output.is_suspended());

        let mut controller = PlaybackController::new(&mut output);
        controller.play(&buffer()).unwrap();
        assert_eq!(ledger.resumed.get(), 1);
        assert_eq!(ledger.started.get(), 2);
    }

    #[test]
    fn test_rodio_output_starts_suspended() {
        let output = RodioOutput::new();
        assert!(output.is_suspended());
    }

    #[test]
    fn test_rodio_output_rejects_zero_sample_rate() {
        let mut output = RodioOutput::new();
        let result = output.start(&AudioBuffer::new(vec![0.0, 0.5], 0));
        assert!(matches!(result, Err(PlaybackError::Start(_))));
    }
}
