pub mod agent;
pub mod config;
pub mod event;
pub mod hackathon;
pub mod task;

pub use agent::{AgentId, AgentRole};
pub use config::{CoordinationConfig, Config, LoggingConfig, PhasePlaybook, TaskTemplate};
pub use event::{
    AlertKind, AlertSeverity, DataQuery, Event, EventId, EventPayload, EventType, QueryResult,
    RequestId, ScheduleItem, ScheduleItemKind, StatusReport, SystemStatusReport,
};
pub use hackathon::{
    AgentActivity, EventDetails, HackathonPhase, HackathonState, Statistics, StatisticsPatch,
};
pub use task::{NewTask, Task, TaskFilter, TaskId, TaskNote, TaskPriority, TaskStatus, FOLLOW_UP_TAG};
