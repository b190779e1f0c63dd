//! Database schema definitions.

/// SQL schema for the program guide database.
pub const SCHEMA_SQL: &str = r#"
-- Program guide table, one row per (network, service, event)
CREATE TABLE IF NOT EXISTS programs (
    id INTEGER PRIMARY KEY,               -- nid * 10^10 + sid * 10^5 + eid
    network_id INTEGER NOT NULL,          -- original_network_id
    service_id INTEGER NOT NULL,
    event_id INTEGER NOT NULL,
    -- Scheduling
    start_at INTEGER NOT NULL,            -- Epoch milliseconds
    duration INTEGER NOT NULL,            -- Milliseconds
    is_free INTEGER NOT NULL DEFAULT 1,
    is_present_following INTEGER NOT NULL DEFAULT 0,
    -- Metadata
    name TEXT,
    description TEXT,
    video TEXT,                           -- JSON object
    genres TEXT,                          -- JSON array
    audios TEXT,                          -- JSON array
    series TEXT,                          -- JSON object
    related_items TEXT,                   -- JSON array
    extended TEXT,                        -- JSON object, label -> text
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_programs_service ON programs(network_id, service_id, start_at);
"#;
