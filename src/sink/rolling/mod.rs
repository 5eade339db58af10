//! Rolling file transport: a size/time/hybrid-rotated append-only file,
//! with discovery of pre-existing rolled files on startup and count/size
//! retention pruning after each rotation (§6).

pub mod discovery;
pub mod naming;
pub mod policy;
pub mod retention;

use crate::transport::Transport;
use parking_lot::Mutex;
use policy::{RotationPolicy, RotationState};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;

struct State {
    active_file: Option<File>,
    rotation: RotationState,
}

pub struct RollingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    max_count: Option<usize>,
    max_total_bytes: Option<u64>,
    state: Mutex<State>,
}

impl RollingFileSink {
    pub fn new(base_path: PathBuf, policy: RotationPolicy, max_count: Option<usize>, max_total_bytes: Option<u64>) -> io::Result<Self> {
        let now = SystemTime::now();
        let rotation = RotationState::new(&policy, now);
        Ok(Self {
            base_path,
            policy,
            max_count,
            max_total_bytes,
            state: Mutex::new(State { active_file: None, rotation }),
        })
    }

    fn ensure_open(&self, state: &mut State) -> io::Result<()> {
        if state.active_file.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.base_path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        state.rotation.record_write(size);
        state.active_file = Some(file);
        Ok(())
    }

    fn rotate(&self, state: &mut State, now: SystemTime) -> io::Result<()> {
        state.active_file = None;

        let kind = naming::kind_for_policy(&self.policy);
        let stamp = naming::stamp_for(kind, now).unwrap_or_default();
        let existing = discovery::discover(&self.base_path, kind)?;
        let seq = discovery::next_sequence(&existing, &stamp);

        let rolled_size_before = std::fs::metadata(&self.base_path).map(|m| m.len()).unwrap_or(0);
        let rolled_path = naming::rolled_name(&self.base_path, &self.policy, now, seq);
        if self.base_path.exists() {
            std::fs::rename(&self.base_path, &rolled_path)?;
        }

        let mut after_rotation = existing;
        after_rotation.push(discovery::DiscoveredFile { path: rolled_path, stamp, seq, size: rolled_size_before });
        after_rotation.sort_by(|a, b| a.stamp.cmp(&b.stamp).then(a.seq.cmp(&b.seq)));
        let to_prune = retention::files_to_prune(&after_rotation, self.max_count, self.max_total_bytes);
        retention::prune(&to_prune);

        state.rotation.reset(&self.policy, now);
        self.ensure_open(state)
    }
}

impl Transport for RollingFileSink {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        self.ensure_open(&mut state)?;

        let now = SystemTime::now();
        let incoming_len = (bytes.len() + 1) as u64;
        if state.rotation.should_rotate(&self.policy, incoming_len, now) {
            self.rotate(&mut state, now)?;
        }

        let file = state.active_file.as_mut().expect("ensured open above");
        file.write_all(bytes)?;
        file.write_all(b"\n")?;
        state.rotation.record_write(incoming_len);
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        let mut state = self.state.lock();
        if let Some(file) = state.active_file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
