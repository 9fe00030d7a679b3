use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::fcntl::OFlag;
use nix::unistd::pipe2;

use crate::types::ShellError;

/// One pipe between two neighbouring stages.
#[derive(Debug)]
pub struct Channel {
    read: OwnedFd,
    write: OwnedFd,
}

/// The N-1 pipes of an N-stage pipeline. Every end is owned here, so the
/// parent's copies are closed as soon as this value is dropped.
#[derive(Debug, Default)]
pub struct Channels {
    channels: Vec<Channel>,
}

impl Channels {
    /// Allocates `count` pipes. If any allocation fails, the ones already
    /// created are closed before the error is returned.
    ///
    /// The ends are close-on-exec, so a child spawned for some other
    /// command can never keep one of them open past its exec.
    pub fn open(count: usize) -> Result<Self, ShellError> {
        let mut channels = Vec::with_capacity(count);
        for _ in 0..count {
            let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(|e| ShellError::os("pipe", e))?;
            channels.push(Channel { read, write });
        }
        tracing::trace!(count, "allocated pipeline channels");
        Ok(Self { channels })
    }

    /// Read end of channel `index`, to become the stdin of stage `index + 1`.
    pub fn reader(&self, index: usize) -> RawFd {
        self.channels[index].read.as_raw_fd()
    }

    /// Write end of channel `index`, to become the stdout of stage `index`.
    pub fn writer(&self, index: usize) -> RawFd {
        self.channels[index].write.as_raw_fd()
    }

    /// Every descriptor a child inherits from this set and has to close
    /// before exec.
    pub fn raw_fds(&self) -> Vec<RawFd> {
        self.channels
            .iter()
            .flat_map(|c| [c.read.as_raw_fd(), c.write.as_raw_fd()])
            .collect()
    }
}
