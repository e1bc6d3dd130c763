//! Host event and output modifier names

/// Events the host fires on its own
pub const OFFICIAL_EVENTS: &[&str] = &[
    "beacon_checkin",
    "beacon_error",
    "beacon_indicator",
    "beacon_initial",
    "beacon_initial_empty",
    "beacon_input",
    "beacon_mode",
    "beacon_output",
    "beacon_output_alt",
    "beacon_output_jobs",
    "beacon_output_ls",
    "beacon_output_ps",
    "beacon_tasked",
    "event_action",
    "event_beacon_initial",
    "event_join",
    "event_newsite",
    "event_notify",
    "event_nouser",
    "event_private",
    "event_public",
    "event_quit",
    "keylogger_hit",
    "profiler_hit",
    "ready",
    "sendmail_done",
    "sendmail_post",
    "sendmail_pre",
    "sendmail_start",
    "ssh_checkin",
    "ssh_error",
    "ssh_indicator",
    "ssh_initial",
    "ssh_input",
    "ssh_output",
    "ssh_output_alt",
    "ssh_tasked",
    "web_hit",
    "any",
    // heartbeats
    "heartbeat_1s",
    "heartbeat_5s",
    "heartbeat_10s",
    "heartbeat_15s",
    "heartbeat_30s",
    "heartbeat_1m",
    "heartbeat_5m",
    "heartbeat_10m",
    "heartbeat_20m",
    "heartbeat_30m",
    "heartbeat_60m",
    // data model
    "applications",
    "archives",
    "beacons",
    "credentials",
    "downloads",
    "keystrokes",
    "screenshots",
    "services",
    "sites",
    "socks",
    "targets",
];

/// Output modifiers the host knows, upper-case
pub const KNOWN_MODIFIERS: &[&str] = &[
    "EVENT_PUBLIC",
    "EVENT_PRIVATE",
    "EVENT_ACTION",
    "EVENT_JOIN",
    "EVENT_QUIT",
    "EVENT_NOTIFY",
    "EVENT_NEWSITE",
    "EVENT_NOUSER",
    "EVENT_BEACON_INITIAL",
    "EVENT_SSH_INITIAL",
    "EVENT_USERS",
    "EVENT_SBAR_LEFT",
    "EVENT_SBAR_RIGHT",
    "WEB_HIT",
    "PROFILER_HIT",
    "KEYLOGGER_HIT",
    "BEACON_SBAR_LEFT",
    "BEACON_SBAR_RIGHT",
    "BEACON_CHECKIN",
    "BEACON_ERROR",
    "BEACON_TASKED",
    "BEACON_OUTPUT",
    "BEACON_OUTPUT_ALT",
    "BEACON_OUTPUT_PS",
    "BEACON_OUTPUT_LS",
    "BEACON_OUTPUT_JOBS",
    "BEACON_OUTPUT_DOWNLOADS",
    "BEACON_OUTPUT_EXPLOITS",
    "BEACON_OUTPUT_HELP",
    "BEACON_OUTPUT_HELP_COMMAND",
    "BEACON_MODE",
    "BEACON_INPUT",
    "SENDMAIL_START",
    "SENDMAIL_PRE",
    "SENDMAIL_POST",
    "SENDMAIL_DONE",
    "SSH_OUTPUT_HELP",
    "SSH_OUTPUT_HELP_COMMAND",
    "SSH_SBAR_LEFT",
    "SSH_SBAR_RIGHT",
    "SSH_CHECKIN",
    "SSH_ERROR",
    "SSH_TASKED",
    "SSH_OUTPUT",
    "SSH_OUTPUT_ALT",
    "SSH_OUTPUT_DOWNLOADS",
    "SSH_INPUT",
];

pub fn is_official_event(name: &str) -> bool {
    OFFICIAL_EVENTS.contains(&name)
}

/// Case-insensitive
pub fn is_known_modifier(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    KNOWN_MODIFIERS.contains(&upper.as_str())
}
