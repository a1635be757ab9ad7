//! Robot state machine
//!
//! A single simulated robot: power, position on a grid, floor served by the
//! lift, and an append-only log of every mutating action.
//!
//! Lifecycle: `Idle` -> `Started` -> `Stopped`, with `reset` returning to
//! `Idle` from anywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MAX_FLOOR, MIN_FLOOR};

/// Message reported by the lift status route
pub const LIFT_OK_MESSAGE: &str = "Lift is functioning normally";

/// Default battery level for a fresh robot
pub const DEFAULT_BATTERY: u8 = 87;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    #[default]
    Idle,
    Started,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Grid direction accepted by `move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Unit step (dx, dy) for this direction
    fn delta(&self) -> (i64, i64) {
        match self {
            Direction::Forward => (0, 1),
            Direction::Backward => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or(RobotError::InvalidDirection)
    }
}

/// One entry of the action log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub action: String,
    pub timestamp: String,
}

/// Read-only projection returned by the status route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: RobotStatus,
    pub is_on: bool,
    pub position: Position,
    pub battery: u8,
    pub holding_object: bool,
    pub floor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftStatus {
    pub current_floor: u32,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RobotError {
    #[error("Robot already started")]
    AlreadyStarted,

    #[error("Robot is off")]
    RobotOff,

    #[error("Invalid direction")]
    InvalidDirection,

    #[error("Floor must be an integer")]
    FloorNotInteger,

    #[error("Invalid floor")]
    InvalidFloor,

    #[error("Robot must be started before requesting the lift")]
    NotStarted,
}

/// The simulated robot
#[derive(Debug, Clone)]
pub struct Robot {
    status: RobotStatus,
    is_on: bool,
    position: Position,
    battery: u8,
    holding_object: bool,
    floor: u32,
    logs: Vec<LogEntry>,
    // Set by `start`, cleared by `reset`; gates lift requests
    started_since_reset: bool,
}

impl Default for Robot {
    fn default() -> Self {
        Self::new(DEFAULT_BATTERY)
    }
}

impl Robot {
    pub fn new(battery: u8) -> Self {
        Self {
            status: RobotStatus::Idle,
            is_on: false,
            position: Position::default(),
            battery: battery.min(100),
            holding_object: false,
            floor: MIN_FLOOR,
            logs: Vec::new(),
            started_since_reset: false,
        }
    }

    /// Power on. Fails if already started.
    pub fn start(&mut self) -> Result<(), RobotError> {
        if self.status == RobotStatus::Started {
            return Err(RobotError::AlreadyStarted);
        }
        self.is_on = true;
        self.status = RobotStatus::Started;
        self.started_since_reset = true;
        self.record("start");
        tracing::info!("Robot started");
        Ok(())
    }

    /// Power off, whatever the current state
    pub fn stop(&mut self) {
        self.is_on = false;
        self.status = RobotStatus::Stopped;
        self.record("stop");
        tracing::info!("Robot stopped");
    }

    /// Back to factory state. Battery is kept; the log is cleared.
    pub fn reset(&mut self) {
        self.is_on = false;
        self.status = RobotStatus::Idle;
        self.position = Position::default();
        self.floor = MIN_FLOOR;
        self.holding_object = false;
        self.logs.clear();
        self.started_since_reset = false;
        tracing::info!("Robot reset");
    }

    /// Step one unit in `direction`.
    ///
    /// Takes the raw requested direction so that a powered-off robot is
    /// reported as such before the direction is validated.
    pub fn move_to(&mut self, direction: Option<&str>) -> Result<Direction, RobotError> {
        if !self.is_on {
            return Err(RobotError::RobotOff);
        }
        let direction: Direction = direction.ok_or(RobotError::InvalidDirection)?.parse()?;

        let (dx, dy) = direction.delta();
        self.position.x += dx;
        self.position.y += dy;
        self.record(&format!("move_{}", direction));
        tracing::debug!(%direction, x = self.position.x, y = self.position.y, "Robot moved");
        Ok(direction)
    }

    /// Ride the lift to `floor`. Position is unchanged.
    pub fn go_to_floor(&mut self, floor: i64) -> Result<u32, RobotError> {
        let floor = u32::try_from(floor)
            .ok()
            .filter(|f| (MIN_FLOOR..=MAX_FLOOR).contains(f))
            .ok_or(RobotError::InvalidFloor)?;

        if !self.started_since_reset {
            return Err(RobotError::NotStarted);
        }

        self.floor = floor;
        self.record(&format!("requested lift to floor {}", floor));
        tracing::info!(floor, "Robot requested lift");
        Ok(floor)
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            is_on: self.is_on,
            position: self.position,
            battery: self.battery,
            holding_object: self.holding_object,
            floor: self.floor,
        }
    }

    pub fn lift_status(&self) -> LiftStatus {
        LiftStatus {
            current_floor: self.floor,
            message: LIFT_OK_MESSAGE.to_string(),
        }
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    fn record(&mut self, action: &str) {
        self.logs.push(LogEntry {
            action: action.to_string(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        });
    }
}

/// Interpret a JSON `floor` field.
///
/// Integers are taken as-is, strings holding a decimal integer are parsed,
/// everything else (missing, fractional, bool, ...) is rejected.
pub fn parse_floor(value: Option<&serde_json::Value>) -> Result<i64, RobotError> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or(RobotError::FloorNotInteger),
        Some(serde_json::Value::String(s)) => {
            s.trim().parse().map_err(|_| RobotError::FloorNotInteger)
        }
        _ => Err(RobotError::FloorNotInteger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn started() -> Robot {
        let mut robot = Robot::default();
        robot.start().unwrap();
        robot
    }

    #[test]
    fn test_fresh_robot() {
        let robot = Robot::default();
        let status = robot.status();

        assert_eq!(status.status, RobotStatus::Idle);
        assert!(!status.is_on);
        assert_eq!(status.position, Position { x: 0, y: 0 });
        assert_eq!(status.battery, DEFAULT_BATTERY);
        assert!(!status.holding_object);
        assert_eq!(status.floor, 1);
        assert!(robot.logs().is_empty());
    }

    #[test]
    fn test_start_and_double_start() {
        let mut robot = started();
        assert!(robot.status().is_on);
        assert_eq!(robot.status().status, RobotStatus::Started);

        assert_eq!(robot.start(), Err(RobotError::AlreadyStarted));
        assert_eq!(robot.logs().len(), 1);
        assert_eq!(robot.logs()[0].action, "start");
    }

    #[test]
    fn test_stop_then_restart() {
        let mut robot = started();
        robot.stop();
        assert!(!robot.status().is_on);
        assert_eq!(robot.status().status, RobotStatus::Stopped);

        robot.start().unwrap();
        let actions: Vec<_> = robot.logs().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["start", "stop", "start"]);
    }

    #[test]
    fn test_move_requires_power() {
        let mut robot = Robot::default();
        for direction in Direction::ALL {
            assert_eq!(robot.move_to(Some(direction.as_str())), Err(RobotError::RobotOff));
        }
        // Off wins over a bad direction
        assert_eq!(robot.move_to(Some("sideways")), Err(RobotError::RobotOff));
        assert!(robot.logs().is_empty());
    }

    #[test]
    fn test_move_directions() {
        let cases = [
            ("forward", 0, 1),
            ("backward", 0, -1),
            ("left", -1, 0),
            ("right", 1, 0),
        ];

        for (direction, dx, dy) in cases {
            let mut robot = started();
            robot.move_to(Some(direction)).unwrap();
            assert_eq!(robot.status().position, Position { x: dx, y: dy }, "{}", direction);
            assert_eq!(robot.logs().last().unwrap().action, format!("move_{}", direction));
        }
    }

    #[test]
    fn test_invalid_direction_leaves_position() {
        let mut robot = started();
        robot.move_to(Some("forward")).unwrap();

        assert_eq!(robot.move_to(Some("sideways")), Err(RobotError::InvalidDirection));
        assert_eq!(robot.move_to(Some("Forward")), Err(RobotError::InvalidDirection));
        assert_eq!(robot.move_to(None), Err(RobotError::InvalidDirection));
        assert_eq!(robot.status().position, Position { x: 0, y: 1 });
        assert_eq!(robot.logs().len(), 2);
    }

    #[test]
    fn test_lift_requires_start() {
        let mut robot = Robot::default();
        assert_eq!(robot.go_to_floor(3), Err(RobotError::NotStarted));
        assert_eq!(robot.status().floor, 1);

        // Stop without a prior start does not unlock the lift
        robot.stop();
        assert_eq!(robot.go_to_floor(3), Err(RobotError::NotStarted));
    }

    #[test]
    fn test_lift_after_stop() {
        let mut robot = started();
        robot.stop();
        assert_eq!(robot.go_to_floor(7), Ok(7));
        assert_eq!(robot.lift_status().current_floor, 7);
    }

    #[test]
    fn test_lift_range() {
        let mut robot = started();
        for floor in [0, -1, 101, i64::MAX] {
            assert_eq!(robot.go_to_floor(floor), Err(RobotError::InvalidFloor));
        }
        assert_eq!(robot.status().floor, 1);

        for floor in 1..=100 {
            assert_eq!(robot.go_to_floor(floor), Ok(floor as u32));
        }
        assert_eq!(robot.status().floor, 100);
    }

    #[test]
    fn test_lift_keeps_position_and_logs() {
        let mut robot = started();
        robot.move_to(Some("forward")).unwrap();
        robot.move_to(Some("right")).unwrap();
        let before = robot.status().position;

        robot.go_to_floor(10).unwrap();

        let status = robot.status();
        assert_eq!(status.floor, 10);
        assert_eq!(status.position, before);
        assert_eq!(robot.logs().last().unwrap().action, "requested lift to floor 10");
        assert_eq!(robot.lift_status().message, LIFT_OK_MESSAGE);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut robot = Robot::new(42);
        robot.start().unwrap();
        robot.move_to(Some("left")).unwrap();
        robot.go_to_floor(55).unwrap();

        robot.reset();

        let status = robot.status();
        assert_eq!(status.status, RobotStatus::Idle);
        assert!(!status.is_on);
        assert_eq!(status.position, Position::default());
        assert_eq!(status.floor, 1);
        assert!(!status.holding_object);
        assert_eq!(status.battery, 42);
        assert!(robot.logs().is_empty());
        assert_eq!(robot.go_to_floor(2), Err(RobotError::NotStarted));
    }

    #[test]
    fn test_battery_clamped() {
        assert_eq!(Robot::new(250).status().battery, 100);
    }

    #[test]
    fn test_log_timestamp_format() {
        let robot = started();
        let ts = &robot.logs()[0].timestamp;
        assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok(), "{}", ts);
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000000".len());
    }

    #[test]
    fn test_status_serialization() {
        let value = serde_json::to_value(started().status()).unwrap();
        assert_eq!(value["status"], "started");
        assert_eq!(value["position"], json!({"x": 0, "y": 0}));
    }

    #[test]
    fn test_parse_floor() {
        assert_eq!(parse_floor(Some(&json!(5))), Ok(5));
        assert_eq!(parse_floor(Some(&json!("12"))), Ok(12));
        assert_eq!(parse_floor(Some(&json!(-3))), Ok(-3));

        assert_eq!(parse_floor(Some(&json!(2.5))), Err(RobotError::FloorNotInteger));
        assert_eq!(parse_floor(Some(&json!("two"))), Err(RobotError::FloorNotInteger));
        assert_eq!(parse_floor(Some(&json!(true))), Err(RobotError::FloorNotInteger));
        assert_eq!(parse_floor(Some(&serde_json::Value::Null)), Err(RobotError::FloorNotInteger));
        assert_eq!(parse_floor(None), Err(RobotError::FloorNotInteger));
    }
}
