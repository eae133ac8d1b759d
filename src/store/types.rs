//! Device message types
//!
//! Wire shapes for everything devices publish and everything sent back to
//! them. JSON uses camelCase field names.
//! - `PrinterTelemetry`: latest operational snapshot of a printer
//! - `PrinterEvent`: an entry in a printer's event log
//! - `PrintJob`: a queued or running job
//! - `EquipmentTelemetry`: snapshot of a non-printer lab device
//! - `PrinterCommand`: an outbound instruction to one printer
//! - `Message`: the generic message envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Open key/value payload attached to events, commands and equipment metrics
pub type Attributes = Map<String, Value>;

/// Operational status of a printer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Idle,
    Printing,
    Paused,
    Error,
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterStatus::Idle => write!(f, "idle"),
            PrinterStatus::Printing => write!(f, "printing"),
            PrinterStatus::Paused => write!(f, "paused"),
            PrinterStatus::Error => write!(f, "error"),
        }
    }
}

/// Latest telemetry snapshot for one printer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrinterTelemetry {
    /// Filled from the topic when routed through ingestion
    #[serde(default)]
    pub printer_id: String,
    /// °C
    #[serde(default)]
    pub nozzle_temperature: f64,
    /// °C
    #[serde(default)]
    pub bed_temperature: f64,
    /// 0-100
    #[serde(default)]
    pub print_progress: f64,
    /// Grams
    #[serde(default)]
    pub filament_remaining: f64,
    /// e.g. "45/200"
    #[serde(default)]
    pub current_layer: String,
    /// mm/s
    #[serde(default)]
    pub print_speed: f64,
    pub status: PrinterStatus,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PrinterTelemetry {
    /// Create a snapshot with zeroed metrics and the current time
    pub fn new(printer_id: impl Into<String>, status: PrinterStatus) -> Self {
        Self {
            printer_id: printer_id.into(),
            nozzle_temperature: 0.0,
            bed_temperature: 0.0,
            print_progress: 0.0,
            filament_remaining: 0.0,
            current_layer: String::new(),
            print_speed: 0.0,
            status,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set print progress, clamped to 0-100
    pub fn progress(mut self, progress: f64) -> Self {
        self.print_progress = progress.clamp(0.0, 100.0);
        self
    }

    /// Builder method: set nozzle and bed temperatures
    pub fn temperatures(mut self, nozzle: f64, bed: f64) -> Self {
        self.nozzle_temperature = nozzle;
        self.bed_temperature = bed;
        self
    }

    pub fn is_printing(&self) -> bool {
        self.status == PrinterStatus::Printing
    }
}

/// Kind of printer event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Error,
    Warning,
    Info,
    Completed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Error => write!(f, "error"),
            EventKind::Warning => write!(f, "warning"),
            EventKind::Info => write!(f, "info"),
            EventKind::Completed => write!(f, "completed"),
        }
    }
}

/// One entry in a printer's event log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrinterEvent {
    #[serde(default)]
    pub printer_id: String,
    #[serde(rename = "eventType")]
    pub kind: EventKind,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Attributes>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PrinterEvent {
    pub fn new(printer_id: impl Into<String>, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            printer_id: printer_id.into(),
            kind,
            message: message.into(),
            job_id: None,
            severity: None,
            source: None,
            data: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Lifecycle status of a print job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    Printing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the job can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

/// A print job record, keyed by job id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    /// Empty when the device omitted it; see [`PrintJob::settle`]
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub printer_id: String,
    #[serde(default)]
    pub file_name: String,
    /// Minutes
    #[serde(default)]
    pub estimated_time: f64,
    /// Grams
    #[serde(default)]
    pub filament_required: f64,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PrintJob {
    pub fn new(printer_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            job_id: new_job_id(),
            printer_id: printer_id.into(),
            file_name: file_name.into(),
            estimated_time: 0.0,
            filament_required: 0.0,
            status: JobStatus::Queued,
            started_at: None,
            completed_at: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set status
    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Fill in what a device report may leave out
    ///
    /// A missing job id is derived from the printer, file name and start
    /// time, so a redelivered report replaces its record instead of adding
    /// one. A terminal status without `completedAt` takes the report's
    /// timestamp.
    pub fn settle(&mut self) {
        if self.job_id.is_empty() {
            self.job_id = self.derived_id();
        }
        if self.status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(self.timestamp);
        }
    }

    /// `printer:file[:started_ms]`, or empty when nothing identifies the job
    fn derived_id(&self) -> String {
        if self.printer_id.is_empty() && self.file_name.is_empty() {
            return String::new();
        }

        let mut id = format!("{}:{}", self.printer_id, self.file_name);
        if let Some(started) = self.started_at {
            id.push_str(&format!(":{}", started.timestamp_millis()));
        }
        id
    }
}

/// Telemetry snapshot for a non-printer lab device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentTelemetry {
    #[serde(default)]
    pub equipment_id: String,
    /// e.g. "cnc_mill", "laser_cutter", "oscilloscope"
    #[serde(default)]
    pub equipment_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Attributes>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl EquipmentTelemetry {
    pub fn new(
        equipment_id: impl Into<String>,
        equipment_type: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            equipment_type: equipment_type.into(),
            status: status.into(),
            metrics: None,
            timestamp: Utc::now(),
        }
    }
}

/// Fixed vocabulary of printer commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    StartPrint,
    PausePrint,
    ResumePrint,
    CancelPrint,
    SetTemperature,
    HomeAxes,
    EmergencyStop,
}

impl CommandAction {
    pub fn all() -> &'static [CommandAction] {
        &[
            CommandAction::StartPrint,
            CommandAction::PausePrint,
            CommandAction::ResumePrint,
            CommandAction::CancelPrint,
            CommandAction::SetTemperature,
            CommandAction::HomeAxes,
            CommandAction::EmergencyStop,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::StartPrint => "start_print",
            CommandAction::PausePrint => "pause_print",
            CommandAction::ResumePrint => "resume_print",
            CommandAction::CancelPrint => "cancel_print",
            CommandAction::SetTemperature => "set_temperature",
            CommandAction::HomeAxes => "home_axes",
            CommandAction::EmergencyStop => "emergency_stop",
        }
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommandAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandAction::all()
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown command action: {}", s))
    }
}

/// An outbound instruction for a single printer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrinterCommand {
    pub action: CommandAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Attributes>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PrinterCommand {
    pub fn new(action: CommandAction) -> Self {
        Self {
            action,
            parameters: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: add a parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Generic message envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: Some(content.into()),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_deserialize_camel_case() {
        let json = r#"{
            "printerId": "printer-7",
            "nozzleTemperature": 215.5,
            "bedTemperature": 60.0,
            "printProgress": 42,
            "filamentRemaining": 310.2,
            "currentLayer": "45/200",
            "printSpeed": 50,
            "status": "printing",
            "timestamp": "2024-03-01T12:00:00Z"
        }"#;
        let t: PrinterTelemetry = serde_json::from_str(json).unwrap();
        assert_eq!(t.printer_id, "printer-7");
        assert_eq!(t.print_progress, 42.0);
        assert_eq!(t.current_layer, "45/200");
        assert_eq!(t.status, PrinterStatus::Printing);
        assert!(t.is_printing());
    }

    #[test]
    fn test_telemetry_defaults_and_rejects_unknown_status() {
        let t: PrinterTelemetry = serde_json::from_str(r#"{"status": "idle"}"#).unwrap();
        assert_eq!(t.printer_id, "");
        assert_eq!(t.nozzle_temperature, 0.0);

        assert!(serde_json::from_str::<PrinterTelemetry>(r#"{"status": "melting"}"#).is_err());
        assert!(serde_json::from_str::<PrinterTelemetry>(r#"{"printProgress": 3}"#).is_err());
    }

    #[test]
    fn test_progress_clamped() {
        let t = PrinterTelemetry::new("p1", PrinterStatus::Printing).progress(140.0);
        assert_eq!(t.print_progress, 100.0);
    }

    #[test]
    fn test_event_wire_names() {
        let json = r#"{"printerId": "printer-3", "eventType": "error", "message": "nozzle jam",
                       "data": {"code": 17}}"#;
        let e: PrinterEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.kind, EventKind::Error);
        assert_eq!(e.message, "nozzle jam");
        assert_eq!(e.data.unwrap()["code"], 17);

        let out = serde_json::to_string(&PrinterEvent::new("p", EventKind::Completed, "done")).unwrap();
        assert!(out.contains("\"eventType\":\"completed\""));
        assert!(!out.contains("jobId"));
    }

    #[test]
    fn test_job_defaults() {
        let job: PrintJob = serde_json::from_str(r#"{"fileName": "benchy.gcode"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.job_id.is_empty());
        assert!(!job.status.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!PrintJob::new("p1", "a.gcode").job_id.is_empty());
    }

    #[test]
    fn test_settle_derives_stable_job_id() {
        let json = r#"{"printerId": "printer-1", "fileName": "benchy.gcode",
                       "startedAt": "2024-03-01T10:00:00Z"}"#;
        let mut first: PrintJob = serde_json::from_str(json).unwrap();
        let mut again: PrintJob = serde_json::from_str(json).unwrap();
        first.settle();
        again.settle();

        assert_eq!(first.job_id, "printer-1:benchy.gcode:1709287200000");
        assert_eq!(first.job_id, again.job_id);

        // An explicit id is kept
        let mut explicit = PrintJob::new("printer-1", "benchy.gcode");
        let id = explicit.job_id.clone();
        explicit.settle();
        assert_eq!(explicit.job_id, id);

        let mut anonymous: PrintJob = serde_json::from_str("{}").unwrap();
        anonymous.settle();
        assert!(anonymous.job_id.is_empty());
    }

    #[test]
    fn test_settle_sets_completed_at_on_terminal_status() {
        let mut printing = PrintJob::new("p1", "a.gcode").status(JobStatus::Printing);
        printing.settle();
        assert!(printing.completed_at.is_none());

        for status in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            let mut job = PrintJob::new("p1", "a.gcode").status(status);
            job.settle();
            assert_eq!(job.completed_at, Some(job.timestamp));
        }

        // A reported completion time wins
        let reported = Utc::now() - chrono::Duration::minutes(5);
        let mut job = PrintJob::new("p1", "a.gcode").status(JobStatus::Completed);
        job.completed_at = Some(reported);
        job.settle();
        assert_eq!(job.completed_at, Some(reported));
    }

    #[test]
    fn test_command_action_roundtrip_names() {
        let cmd: PrinterCommand = serde_json::from_str(
            r#"{"action": "set_temperature", "parameters": {"nozzle": 210}}"#,
        )
        .unwrap();
        assert_eq!(cmd.action, CommandAction::SetTemperature);
        assert_eq!(cmd.parameters.unwrap()["nozzle"], 210);

        assert_eq!("home_axes".parse::<CommandAction>(), Ok(CommandAction::HomeAxes));
        assert!("self_destruct".parse::<CommandAction>().is_err());
        assert!(serde_json::from_str::<PrinterCommand>(r#"{"action": "dance"}"#).is_err());
    }

    #[test]
    fn test_command_param_builder() {
        let cmd = PrinterCommand::new(CommandAction::SetTemperature).param("bed", 65);
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "set_temperature");
        assert_eq!(json["parameters"]["bed"], 65);
    }

    #[test]
    fn test_message_defaults() {
        let msg: Message = serde_json::from_str(r#"{"content": "hello"}"#).unwrap();
        assert_eq!(msg.content.as_deref(), Some("hello"));
        assert!(!msg.id.is_nil());
    }
}
