//! Incremental electronic program guide builder.
//!
//! Feeds decoded EIT sections through per-event version gates and writes
//! program records to a [`store::ProgramStore`].
//!
//! ```no_run
//! use epg_ingest::epg::{Epg, EpgConfig};
//! use epg_ingest::store::MemoryStore;
//!
//! # async fn example(sections: Vec<epg_protocol::EitSection>) {
//! let (writer, handle) = Epg::spawn(MemoryStore::new(), EpgConfig::default());
//! for section in sections {
//!     writer.write(section);
//! }
//! writer.end();
//! let store = handle.await.unwrap();
//! println!("{} programs", store.len());
//! # }
//! ```

pub mod aribb24;
pub mod database;
pub mod epg;
pub mod logging;
pub mod source;
pub mod store;
