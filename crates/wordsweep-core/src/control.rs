//! 协作式控制信号（Running / Paused / Cancelled）
//!
//! 调用方通过 `pause` / `resume` / `cancel` 改变状态；扫描循环只读取状态，
//! 并且只在两个检查点观察它：开始下一个文件之前，以及暂停等待期间。
//! 暂停基于条件变量等待，不占用 CPU。
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// 控制状态；Cancelled 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Running,
    Paused,
    Cancelled,
}

/// 检查点的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    Proceed,
    Cancelled,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<ControlState>,
    cond: Condvar,
}

/// 调用方与扫描线程共享的控制通道（克隆即共享同一状态）
#[derive(Debug, Clone)]
pub struct ControlSignal {
    inner: Arc<Inner>,
}

impl Default for ControlSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ControlState::Running),
                cond: Condvar::new(),
            }),
        }
    }

    /// Running → Paused；其余状态不变
    pub fn pause(&self) {
        let mut state = self.inner.state.lock();
        if *state == ControlState::Running {
            *state = ControlState::Paused;
        }
    }

    /// Paused → Running；已取消时无效
    pub fn resume(&self) {
        let mut state = self.inner.state.lock();
        if *state == ControlState::Paused {
            *state = ControlState::Running;
            self.inner.cond.notify_all();
        }
    }

    /// 任意状态 → Cancelled，并唤醒所有等待者
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock();
        *state = ControlState::Cancelled;
        self.inner.cond.notify_all();
    }

    pub fn state(&self) -> ControlState {
        *self.inner.state.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == ControlState::Cancelled
    }

    /// 文件间检查点：暂停时阻塞到恢复或取消
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        let mut state = self.inner.state.lock();
        loop {
            match *state {
                ControlState::Running => return Checkpoint::Proceed,
                ControlState::Cancelled => return Checkpoint::Cancelled,
                ControlState::Paused => self.inner.cond.wait(&mut state),
            }
        }
    }

    /// 节流等待：最多等待 `dur`，期间取消会立即返回 `Checkpoint::Cancelled`
    pub(crate) fn throttle(&self, dur: Duration) -> Checkpoint {
        if dur.is_zero() {
            return if self.is_cancelled() { Checkpoint::Cancelled } else { Checkpoint::Proceed };
        }
        let deadline = Instant::now() + dur;
        let mut state = self.inner.state.lock();
        while *state != ControlState::Cancelled {
            if self.inner.cond.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        if *state == ControlState::Cancelled {
            Checkpoint::Cancelled
        } else {
            Checkpoint::Proceed
        }
    }
}
