//! # Teleop Loop Module
//!
//! Fixed-rate sampling loop turning keystrokes into joystick messages.
//!
//! ## Cycle
//!
//! ```text
//! IDLE → DRAIN_KEYS → UPDATE_STATE → RENDER → PUBLISH → RESET → (sleep) → IDLE
//! ```
//!
//! Buttons are momentary: every cycle publishes what was pressed since the
//! previous cycle, then releases everything. A held key keeps its button
//! active only if the terminal re-delivers it every cycle (key repeat).
//!
//! ## Screen Layout
//!
//! | Line | Content |
//! |------|---------|
//! | 1 | Node name |
//! | 2 | Velocity (always zero) |
//! | 3 | Last keycode |
//! | 4 | Active button count |
//! | 5 | Usage hint |
//! | 6 | Key legend (several rows) |

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::buttons::{ButtonModel, ButtonState};
use super::keymap::{is_shutdown_key, KeyBinding};
use crate::bus::messages::{Header, Joy, Twist};
use crate::bus::transport::BusTransport;
use crate::bus::{Bus, Topic};
use crate::config::{Config, MIN_DISPLAY_LINES};
use crate::display::grid::{Grid, Keycode};
use crate::display::TextWindow;
use crate::error::{FakeJoyError, Result};

/// Number of cycles between status log messages
pub const LOG_INTERVAL_CYCLES: u64 = 100;

/// Static usage hint shown on every render
pub const USAGE_HINT: &str = "Tap the keys below to press buttons, q to exit.";

/// Key legend entries per screen row
const LEGEND_PER_LINE: usize = 4;

const TITLE_LINE: usize = 1;
const VELOCITY_LINE: usize = 2;
const KEYCODE_LINE: usize = 3;
const BUTTONS_LINE: usize = 4;
const USAGE_LINE: usize = 5;
const LEGEND_LINE: usize = 6;

/// Running totals of the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Completed cycles (rendered and published)
    pub cycles: u64,
    /// Joy messages handed to the transport
    pub published: u64,
    /// Joy messages the transport rejected
    pub failed: u64,
}

/// What a single render shows; rebuilt every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSnapshot {
    pub last_key: Option<Keycode>,
    pub active_buttons: usize,
    pub total_buttons: usize,
    pub velocity: Twist,
}

impl CycleSnapshot {
    /// Velocity status line
    pub fn velocity_line(&self) -> String {
        format!(
            "Linear: {:.6}, Angular: {:.6}",
            self.velocity.linear, self.velocity.angular
        )
    }

    /// Last keycode status line
    pub fn keycode_line(&self) -> String {
        format!("keycode: {}", describe_key(self.last_key))
    }

    /// Button count status line
    pub fn buttons_line(&self) -> String {
        format!(
            "buttons: {} of {} active",
            self.active_buttons, self.total_buttons
        )
    }
}

/// Human-readable keycode, e.g. `'j' (106)`
pub fn describe_key(key: Option<Keycode>) -> String {
    match key {
        None => "-".to_string(),
        Some(code) => match char::from_u32(code) {
            Some(c) if !c.is_control() => format!("'{}' ({})", c, code),
            _ => code.to_string(),
        },
    }
}

/// Keyboard-driven fake joystick
///
/// Owns the button model, the key table and the button vector, and drives
/// the display and the bus from a single task.
///
/// # Examples
///
/// ```no_run
/// use fake_joy::bus::Bus;
/// use fake_joy::bus::transport::UdpTransport;
/// use fake_joy::config::Config;
/// use fake_joy::controller::teleop::Controller;
/// use fake_joy::display::TextWindow;
/// use fake_joy::display::terminal::CrosstermGrid;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::default();
///     let transport = UdpTransport::bind(config.bind_addr()?, config.target_addr()?).await?;
///     let bus = Bus::new(&config.bus.node_name, transport);
///     let window = TextWindow::new(CrosstermGrid::open()?, config.display.lines, config.display.margin)?;
///
///     let mut controller = Controller::new(window, bus, &config)?;
///     controller.run().await?;
///     Ok(())
/// }
/// ```
pub struct Controller<G: Grid, T: BusTransport> {
    window: TextWindow<G>,
    bus: Bus<T>,
    joy_topic: Topic<Joy>,
    velocity_topic: Topic<Twist>,
    model: ButtonModel,
    bindings: KeyBinding,
    buttons: ButtonState,
    velocity: Twist,
    legend: String,
    period: Duration,
    beep_on_unmapped: bool,
    running: bool,
    last_key: Option<Keycode>,
    seq: u64,
    stats: CycleStats,
}

impl<G: Grid, T: BusTransport> Controller<G, T> {
    /// Controller with the Logitech F710 model and default key bindings
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the window has too
    /// few lines for the status screen.
    pub fn new(window: TextWindow<G>, bus: Bus<T>, config: &Config) -> Result<Self> {
        Self::with_layout(
            window,
            bus,
            config,
            ButtonModel::logitech_f710(),
            KeyBinding::default(),
        )
    }

    /// Controller with a custom button model and key table
    ///
    /// Bindings to buttons missing from `model` are kept but never fire.
    pub fn with_layout(
        window: TextWindow<G>,
        mut bus: Bus<T>,
        config: &Config,
        model: ButtonModel,
        bindings: KeyBinding,
    ) -> Result<Self> {
        config.validate()?;
        if window.num_lines() < MIN_DISPLAY_LINES {
            return Err(FakeJoyError::LineOutOfRange {
                index: LEGEND_LINE,
                lines: window.num_lines(),
            });
        }

        let joy_topic = bus.advertise::<Joy>(&config.bus.joy_topic);
        let velocity_topic = bus.advertise::<Twist>(&config.bus.velocity_topic);

        let teleop = &config.teleop;
        info!(
            "Velocity rates forward={} backward={} rotation={} (no key drives {})",
            teleop.forward_rate,
            teleop.backward_rate,
            teleop.rotation_rate,
            velocity_topic.name()
        );

        for (key, button) in bindings.iter() {
            if model.index_of(button).is_none() {
                warn!("Key {} bound to {} which is not in the button model", key, button);
            }
        }

        Ok(Self {
            window,
            bus,
            joy_topic,
            velocity_topic,
            buttons: ButtonState::new(&model),
            legend: bindings.legend(LEGEND_PER_LINE),
            model,
            bindings,
            velocity: Twist::default(),
            period: Duration::from_secs_f64(1.0 / teleop.tick_rate),
            beep_on_unmapped: config.display.beep_on_unmapped,
            running: true,
            last_key: None,
            seq: 0,
            stats: CycleStats::default(),
        })
    }

    /// Run cycles at the configured rate until shutdown
    ///
    /// Shutdown is the `q` key, Ctrl+C delivered as a key in raw mode, or
    /// SIGINT.
    ///
    /// # Errors
    ///
    /// Returns error on terminal I/O failure or a render programming error.
    /// Publish failures are logged and never end the loop.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting teleop loop at {:.1}Hz, publishing {} buttons on {}",
            1.0 / self.period.as_secs_f64(),
            self.model.len(),
            self.joy_topic.name()
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);
        let mut watch_signal = true;

        while self.running {
            tokio::select! {
                _ = ticker.tick() => {
                    self.step().await?;
                }

                result = &mut interrupt, if watch_signal => {
                    match result {
                        Ok(()) => {
                            info!("Received Ctrl+C, shutting down...");
                            self.running = false;
                        }
                        Err(e) => {
                            warn!("Cannot listen for Ctrl+C: {}", e);
                            watch_signal = false;
                        }
                    }
                }
            }
        }

        info!(
            "Teleop stopped after {} cycles ({} published, {} failed)",
            self.stats.cycles, self.stats.published, self.stats.failed
        );
        Ok(())
    }

    /// Run one cycle without sleeping
    ///
    /// When the shutdown key arrives the cycle's button state is discarded:
    /// nothing is rendered or published.
    pub async fn step(&mut self) -> Result<()> {
        self.drain_keys()?;

        if !self.running {
            debug!("Discarding cycle state on shutdown");
            self.buttons.reset();
            return Ok(());
        }

        self.render()?;
        self.publish().await;
        self.buttons.reset();

        self.stats.cycles += 1;
        if self.stats.cycles % LOG_INTERVAL_CYCLES == 0 {
            info!(
                "Completed {} cycles ({} published, {} failed)",
                self.stats.cycles, self.stats.published, self.stats.failed
            );
        }
        Ok(())
    }

    fn drain_keys(&mut self) -> Result<()> {
        while self.running {
            match self.window.read_key()? {
                Some(key) => self.handle_key(key)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Apply one keystroke to the button vector
    pub fn handle_key(&mut self, key: Keycode) -> Result<()> {
        self.last_key = Some(key);

        if is_shutdown_key(key) {
            info!("Shutdown key pressed");
            self.running = false;
            return Ok(());
        }

        let bound = self
            .bindings
            .button_for(key)
            .and_then(|button| self.model.index_of(button).map(|index| (button, index)));

        match bound {
            Some((button, index)) => {
                trace!("Key {} pressed {}", describe_key(Some(key)), button);
                self.buttons.press(index);
            }
            None => {
                trace!("Ignoring unmapped key {}", describe_key(Some(key)));
                if self.beep_on_unmapped {
                    self.window.beep()?;
                }
            }
        }
        Ok(())
    }

    /// Render state of the current cycle
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            last_key: self.last_key,
            active_buttons: self.buttons.active_count(),
            total_buttons: self.buttons.len(),
            velocity: self.velocity,
        }
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        let title = format!("Fake joystick [{}]", self.bus.node_name());

        self.window.clear()?;
        self.window.write_line(TITLE_LINE, &title)?;
        self.window.write_line(VELOCITY_LINE, &snapshot.velocity_line())?;
        self.window.write_line(KEYCODE_LINE, &snapshot.keycode_line())?;
        self.window.write_line(BUTTONS_LINE, &snapshot.buttons_line())?;
        self.window.write_line(USAGE_LINE, USAGE_HINT)?;
        self.window.write_line(LEGEND_LINE, &self.legend)?;
        self.window.refresh()
    }

    async fn publish(&mut self) {
        let header = Header::now(self.seq, self.bus.node_name());
        let joy = Joy::new(header, self.buttons.as_slice().to_vec());
        self.seq += 1;

        match self.bus.publish(&self.joy_topic, &joy).await {
            Ok(()) => self.stats.published += 1,
            Err(e) => {
                self.stats.failed += 1;
                warn!("Failed to publish {}: {}", self.joy_topic.name(), e);
            }
        }
    }

    /// Current button vector
    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    /// Whether the loop will run another cycle
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Loop totals so far
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Tick period derived from the tick rate
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Declared velocity topic; never published
    pub fn velocity_topic(&self) -> &Topic<Twist> {
        &self.velocity_topic
    }

    /// Borrow the display
    pub fn window(&self) -> &TextWindow<G> {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::transport::mocks::MockTransport;
    use crate::controller::buttons::Button;
    use crate::display::mocks::MemoryGrid;
    use serde_json::Value;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.teleop.tick_rate = 200.0;
        config
    }

    fn controller_with(grid: MemoryGrid, config: &Config) -> (Controller<MemoryGrid, MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        let bus = Bus::new(&config.bus.node_name, transport.clone());
        let window = TextWindow::new(grid, config.display.lines, config.display.margin).unwrap();
        (Controller::new(window, bus, config).unwrap(), transport)
    }

    fn controller(keys: &str) -> (Controller<MemoryGrid, MockTransport>, MockTransport) {
        controller_with(MemoryGrid::new(80, 24).with_keys(keys), &test_config())
    }

    fn published_buttons(transport: &MockTransport) -> Vec<Vec<bool>> {
        transport
            .get_sent_frames()
            .iter()
            .map(|frame| {
                let value: Value = serde_json::from_slice(frame).unwrap();
                assert_eq!(value["topic"], "joy");
                serde_json::from_value(value["msg"]["buttons"].clone()).unwrap()
            })
            .collect()
    }

    fn only(index: usize) -> Vec<bool> {
        let mut expected = vec![false; 11];
        expected[index] = true;
        expected
    }

    #[test]
    fn test_period_from_tick_rate() {
        let (controller, _) = controller_with(MemoryGrid::new(80, 24), &Config::default());
        assert_eq!(controller.period(), Duration::from_millis(100));
    }

    #[test]
    fn test_fresh_state_all_released() {
        let (controller, _) = controller("");
        assert_eq!(controller.buttons().len(), 11);
        assert_eq!(controller.buttons().active_count(), 0);
        assert!(controller.is_running());
        assert_eq!(controller.velocity_topic().name(), "key_vel");
    }

    #[test]
    fn test_too_few_lines_rejected() {
        let config = test_config();
        let bus = Bus::new("n", MockTransport::new());
        let window = TextWindow::new(MemoryGrid::new(80, 24), MIN_DISPLAY_LINES - 1, 10).unwrap();
        assert!(Controller::new(window, bus, &config).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.teleop.tick_rate = 0.0;
        let bus = Bus::new("n", MockTransport::new());
        let window = TextWindow::new(MemoryGrid::new(80, 24), 10, 10).unwrap();
        assert!(matches!(Controller::new(window, bus, &config), Err(FakeJoyError::Config(_))));
    }

    #[tokio::test]
    async fn test_each_bound_key_publishes_its_button() {
        let model = ButtonModel::logitech_f710();
        for (key, button) in KeyBinding::default().iter() {
            let c = char::from_u32(key).unwrap().to_string();
            let (mut controller, transport) = controller(&c);

            controller.step().await.unwrap();

            let expected = only(model.index_of(button).unwrap());
            assert_eq!(published_buttons(&transport), vec![expected], "key {}", c);
        }
    }

    #[tokio::test]
    async fn test_burst_presses_independent_buttons() {
        let (mut controller, transport) = controller("ji");
        controller.step().await.unwrap();

        let published = published_buttons(&transport);
        assert_eq!(published.len(), 1);
        assert!(published[0][2], "X_BUTTON should be active");
        assert!(published[0][3], "Y_BUTTON should be active");
        assert_eq!(published[0].iter().filter(|&&b| b).count(), 2);
    }

    #[tokio::test]
    async fn test_repeated_key_in_burst() {
        let (mut controller, transport) = controller("jjj");
        controller.step().await.unwrap();
        assert_eq!(published_buttons(&transport), vec![only(2)]);
    }

    #[tokio::test]
    async fn test_unmapped_key_is_ignored() {
        let (mut controller, transport) = controller("z7\t");
        controller.step().await.unwrap();

        assert_eq!(published_buttons(&transport), vec![vec![false; 11]]);
        assert_eq!(controller.window().grid().flashes, 0);
        assert!(controller.is_running());
    }

    #[tokio::test]
    async fn test_unmapped_key_beeps_when_enabled() {
        let mut config = test_config();
        config.display.beep_on_unmapped = true;
        let (mut controller, _) = controller_with(MemoryGrid::new(80, 24).with_keys("zj"), &config);

        controller.step().await.unwrap();

        assert_eq!(controller.window().grid().flashes, 1);
    }

    #[tokio::test]
    async fn test_buttons_reset_after_publish() {
        let mut grid = MemoryGrid::new(80, 24).with_keys("m");
        grid.push_idle();
        let (mut controller, transport) = controller_with(grid, &test_config());

        controller.step().await.unwrap();
        assert_eq!(controller.buttons().active_count(), 0);

        // No key re-delivered: the button is not held
        controller.step().await.unwrap();
        assert_eq!(published_buttons(&transport), vec![only(0), vec![false; 11]]);
    }

    #[tokio::test]
    async fn test_shutdown_discards_cycle() {
        let (mut controller, transport) = controller("jq");
        controller.step().await.unwrap();

        assert!(!controller.is_running());
        assert!(transport.get_sent_frames().is_empty());
        assert_eq!(controller.buttons().active_count(), 0);
        assert_eq!(controller.stats().cycles, 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_draining() {
        let (mut controller, _) = controller("qj");
        controller.step().await.unwrap();

        assert_eq!(controller.buttons().active_count(), 0);
        assert_eq!(controller.window().grid().keys.len(), 1);
    }

    #[tokio::test]
    async fn test_ctrl_c_key_shuts_down() {
        let (mut controller, _) = controller("\u{3}");
        controller.step().await.unwrap();
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_run_until_shutdown_key() {
        let mut grid = MemoryGrid::new(80, 24).with_keys("j");
        grid.push_idle();
        grid.push_keys("i");
        grid.push_idle();
        grid.push_keys("kq");
        let (mut controller, transport) = controller_with(grid, &test_config());

        tokio::time::timeout(Duration::from_secs(5), controller.run())
            .await
            .expect("loop should stop on q")
            .unwrap();

        assert_eq!(published_buttons(&transport), vec![only(2), only(3)]);
        assert_eq!(controller.stats(), CycleStats { cycles: 2, published: 2, failed: 0 });

        // Stopped loop publishes nothing more
        controller.run().await.unwrap();
        assert_eq!(transport.get_sent_frames().len(), 2);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_loop() {
        let mut grid = MemoryGrid::new(80, 24).with_keys("j");
        grid.push_idle();
        grid.push_keys("q");
        let (mut controller, transport) = controller_with(grid, &test_config());
        transport.set_send_error(std::io::ErrorKind::ConnectionRefused);

        tokio::time::timeout(Duration::from_secs(5), controller.run())
            .await
            .expect("loop should stop on q")
            .unwrap();

        assert_eq!(controller.stats(), CycleStats { cycles: 1, published: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_header_sequence_increments() {
        let mut grid = MemoryGrid::new(80, 24);
        grid.push_idle();
        grid.push_idle();
        let (mut controller, transport) = controller_with(grid, &test_config());

        controller.step().await.unwrap();
        controller.step().await.unwrap();

        let seqs: Vec<u64> = transport
            .get_sent_frames()
            .iter()
            .map(|frame| {
                let value: Value = serde_json::from_slice(frame).unwrap();
                assert_eq!(value["msg"]["header"]["frame_id"], "fake_joy_teleop");
                value["msg"]["header"]["seq"].as_u64().unwrap()
            })
            .collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_render_status_lines() {
        let (mut controller, _) = controller("jiz");
        controller.step().await.unwrap();

        let grid = controller.window().grid();
        // 24 rows over 10 lines: line n starts at row 24 * n / 10
        assert!(grid.row(2).ends_with("Fake joystick [fake_joy_teleop]"));
        assert!(grid.row(4).ends_with("Linear: 0.000000, Angular: 0.000000"));
        assert!(grid.row(7).ends_with("keycode: 'z' (122)"));
        assert!(grid.row(9).ends_with("buttons: 2 of 11 active"));
        assert!(grid.row(12).ends_with(USAGE_HINT));
        assert!(grid.row(14).contains("a=BACK"));
        assert!(grid.row(15).trim_start().starts_with("j=X_BUTTON"));
        assert!(grid.row(16).trim_start().starts_with("r=RIGHT_JOYSTICK"));
        assert_eq!(grid.flushes, 1);
        assert_eq!(grid.clears, 1);
    }

    #[tokio::test]
    async fn test_render_before_any_key() {
        let (mut controller, _) = controller("");
        controller.step().await.unwrap();
        assert!(controller.window().grid().contains("keycode: -"));
        assert!(controller.window().grid().contains("buttons: 0 of 11 active"));
    }

    #[tokio::test]
    async fn test_custom_layout() {
        let config = test_config();
        let transport = MockTransport::new();
        let bus = Bus::new("n", transport.clone());
        let window = TextWindow::new(MemoryGrid::new(80, 24).with_keys("xyj"), 10, 10).unwrap();
        let model = ButtonModel::new(vec![Button::Y, Button::X]).unwrap();
        let bindings = KeyBinding::new([('x', Button::X), ('y', Button::Y), ('j', Button::Start)]).unwrap();

        let mut controller = Controller::with_layout(window, bus, &config, model, bindings).unwrap();
        controller.step().await.unwrap();

        // 'j' is bound to a button outside the model and never fires
        assert_eq!(published_buttons(&transport), vec![vec![true, true]]);
    }

    #[test]
    fn test_handle_key_updates_last_key() {
        let (mut controller, _) = controller("");
        controller.handle_key(u32::from('k')).unwrap();
        controller.handle_key(u32::from('?')).unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.last_key, Some(u32::from('?')));
        assert_eq!(snapshot.active_buttons, 1);
        assert!(controller.buttons().is_pressed(1));
    }

    #[test]
    fn test_describe_key() {
        assert_eq!(describe_key(None), "-");
        assert_eq!(describe_key(Some(106)), "'j' (106)");
        assert_eq!(describe_key(Some(27)), "27");
        assert_eq!(describe_key(Some(0xD800)), "55296");
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_CYCLES, 100);
        // At the default 10Hz, 100 cycles = 10 seconds
        let seconds = LOG_INTERVAL_CYCLES as f64 / 10.0;
        assert_eq!(seconds, 10.0);
    }
}
