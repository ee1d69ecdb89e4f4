//! 番茄工作法状态与计时逻辑（一次调用推进一帧，状态由仓储落盘）

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StateRecord;

/// 运行中图标
const ICON_RUN: &str = "➤";
/// 暂停图标
const ICON_PAUSE: &str = "Ⅱ";

/// 番茄钟阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 首次启动前的空闲态（周期长度为零，因此「下一阶段」总是可用）
    #[serde(rename = "NOTHING")]
    Nothing,
    /// 专注工作（默认 25 分钟）
    #[serde(rename = "WORK")]
    Work,
    /// 短休息（默认 5 分钟）
    #[serde(rename = "SHORTBREAK")]
    ShortBreak,
    /// 长休息（4 个番茄后，默认 15 分钟）
    #[serde(rename = "LONGBREAK")]
    LongBreak,
}

impl Phase {
    /// 状态栏里显示的阶段名
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Nothing => "NOTHING",
            Phase::Work => "WORK",
            Phase::ShortBreak => "SHORTBREAK",
            Phase::LongBreak => "LONGBREAK",
        }
    }
}

/// 番茄工作法配置（单位：秒）
#[derive(Clone, Debug)]
pub struct PomodoroConfig {
    pub work_secs: i64,
    pub short_break_secs: i64,
    pub long_break_secs: i64,
    /// 几个番茄后进入长休息
    pub sprint_length: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            sprint_length: 4,
        }
    }
}

/// 番茄钟核心状态
///
/// 进程每次被 i3blocks 调起只活一瞬间，需要「现在」的方法都把
/// `now` 作为参数传入，便于测试时控制时钟。
#[derive(Clone, Debug)]
pub struct Pomo {
    pub config: PomodoroConfig,
    pub status: Phase,
    /// 当前冲刺里已完成的 WORK 数（SHORTBREAK→WORK 时 +1，LONGBREAK→WORK 时回到 1）
    pub sprint_circle: u32,
    /// 计时锚点：运行时 elapsed = now - started_time
    pub started_time: DateTime<Utc>,
    pub elapsed_time: TimeDelta,
    pub is_paused: bool,
    /// 暂停时快照的已用时长
    pub delta: TimeDelta,
    /// 派生：当前阶段的目标时长
    pub period_length: TimeDelta,
    /// 派生：elapsed_time >= period_length
    pub period_ended: bool,
}

impl Pomo {
    /// 初始状态：空闲、暂停、零计时（记录文件不存在时使用）
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            config: PomodoroConfig::default(),
            status: Phase::Nothing,
            sprint_circle: 0,
            started_time: now,
            elapsed_time: TimeDelta::zero(),
            is_paused: true,
            delta: TimeDelta::zero(),
            period_length: TimeDelta::zero(),
            period_ended: false,
        }
    }

    /// 从落盘记录恢复（派生字段由随后的 `calc_times` 重算）
    pub fn from_record(record: StateRecord) -> Self {
        Self {
            config: PomodoroConfig::default(),
            status: record.status,
            sprint_circle: record.sprint_circle,
            started_time: record.started_time,
            elapsed_time: TimeDelta::seconds(record.elapsed_time),
            is_paused: record.is_paused,
            delta: TimeDelta::seconds(record.delta),
            period_length: TimeDelta::zero(),
            period_ended: false,
        }
    }

    /// 生成落盘记录；暂停时把 delta 重新快照为 now - started_time，
    /// 保证恢复时从正确的偏移继续计时
    pub fn to_record(&self, now: DateTime<Utc>) -> StateRecord {
        let delta = if self.is_paused {
            now - self.started_time
        } else {
            self.delta
        };
        StateRecord {
            status: self.status,
            sprint_circle: self.sprint_circle,
            started_time: self.started_time,
            elapsed_time: self.elapsed_time.num_seconds(),
            is_paused: self.is_paused,
            delta: delta.num_seconds(),
        }
    }

    fn phase_length(&self, phase: Phase) -> TimeDelta {
        match phase {
            Phase::Work => TimeDelta::seconds(self.config.work_secs),
            Phase::ShortBreak => TimeDelta::seconds(self.config.short_break_secs),
            Phase::LongBreak => TimeDelta::seconds(self.config.long_break_secs),
            // Nothing 没有目标时长，取零使 period_ended 恒为真，
            // 这样首次「下一阶段」事件才能生效
            Phase::Nothing => TimeDelta::zero(),
        }
    }

    /// 重算派生字段：elapsed_time、period_length、period_ended。
    /// 暂停时同时把 started_time 重推为 now - delta，恢复计时无需额外簿记
    pub fn calc_times(&mut self, now: DateTime<Utc>) {
        if !self.is_paused {
            self.elapsed_time = now - self.started_time;
        } else {
            self.elapsed_time = self.delta;
            self.started_time = now - self.delta;
        }
        self.period_length = self.phase_length(self.status);
        self.period_ended = self.elapsed_time >= self.period_length;
    }

    /// 暂停 / 继续；进入暂停的瞬间快照 delta
    pub fn toggle_pause_state(&mut self, now: DateTime<Utc>) {
        self.is_paused = !self.is_paused;
        if self.is_paused {
            self.delta = now - self.started_time;
        }
    }

    /// 锚点前移 1 分钟：已用时长看起来多 1 分钟，周期提前结束
    pub fn shorten_1min(&mut self, now: DateTime<Utc>) {
        self.started_time -= TimeDelta::minutes(1);
        self.snapshot_delta(now);
        self.calc_times(now);
    }

    /// 锚点后移 1 分钟：周期延后结束
    pub fn prolong_1min(&mut self, now: DateTime<Utc>) {
        self.started_time += TimeDelta::minutes(1);
        self.snapshot_delta(now);
        self.calc_times(now);
    }

    /// 暂停态下锚点被挪动后，delta 必须跟着重新快照，
    /// 否则 `calc_times` 的暂停分支会原样抹掉调整
    fn snapshot_delta(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            self.delta = now - self.started_time;
        }
    }

    /// 当前周期已结束时切换到下一阶段（否则忽略）。
    /// 判定用的是本次调用进入事件处理前算出的 period_ended，
    /// 切换后由 `start_period` 重新评估一次，不做跨多个周期的追赶循环
    pub fn next_period(&mut self, now: DateTime<Utc>) {
        if !self.period_ended {
            return;
        }
        match self.status {
            Phase::Work => {
                if self.sprint_circle >= self.config.sprint_length {
                    self.status = Phase::LongBreak;
                } else {
                    self.status = Phase::ShortBreak;
                }
            }
            Phase::ShortBreak => {
                self.sprint_circle += 1;
                self.status = Phase::Work;
            }
            Phase::LongBreak | Phase::Nothing => {
                self.sprint_circle = 1;
                self.status = Phase::Work;
            }
        }
        self.start_period(now);
    }

    /// 以 now 为锚点重新开始当前阶段（仅当上一轮判定周期已结束）
    pub fn start_period(&mut self, now: DateTime<Utc>) {
        if self.period_ended {
            self.started_time = now;
            self.calc_times(now);
        }
    }

    /// 暂停态图标
    pub fn state_icon(&self) -> &'static str {
        if self.is_paused { ICON_PAUSE } else { ICON_RUN }
    }

    /// 状态栏输出行：`<阶段><WORK 时附番茄数>: <图标> <已用>/<目标> `
    pub fn output(&self) -> String {
        let mut label = self.status.as_str().to_string();
        if self.status == Phase::Work {
            label.push_str(&self.sprint_circle.to_string());
        }
        format!(
            "{}: {} {}/{} ",
            label,
            self.state_icon(),
            format_seconds(self.elapsed_time),
            format_seconds(self.period_length),
        )
    }
}

/// 时长格式化为 "MM:SS"：整秒截断，分钟数不封顶
pub fn format_seconds(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}
