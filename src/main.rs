//! Tomato Bar — i3blocks 番茄钟 blocklet
//!
//! 状态栏每次刷新调起本进程一次：读盘、按流逝时间推进、最多响应一个
//! 鼠标事件、落盘、打印一行状态后退出。stdout 只输出这一行（i3blocks
//! 协议），日志走 stderr。

mod event;
mod pomodoro;
mod store;

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::event::Event;
use crate::pomodoro::Pomo;
use crate::store::{FileStore, RecordStore, StoreError};

/// 单次调用的完整流程，返回要打印的状态行
fn run(
    store: &impl RecordStore,
    event: Option<Event>,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let mut pomo = match store.load()? {
        Some(record) => Pomo::from_record(record),
        None => {
            // 首次调用：立即落盘，把记录文件建立起来
            debug!("no record found, initializing defaults");
            let pomo = Pomo::new(now);
            store.save(&pomo.to_record(now))?;
            pomo
        }
    };
    pomo.calc_times(now);

    let mut deleted = false;
    match event {
        Some(Event::TogglePause) => pomo.toggle_pause_state(now),
        Some(Event::Reset) => {
            // 只删文件，本次仍按删除前的内存状态渲染；
            // 下次调用读不到记录自然回到初始状态
            store.delete()?;
            deleted = true;
        }
        Some(Event::NextPeriod) => pomo.next_period(now),
        Some(Event::Shorten) => pomo.shorten_1min(now),
        Some(Event::Prolong) => pomo.prolong_1min(now),
        None => {}
    }
    if let Some(event) = event {
        debug!(?event, status = pomo.status.as_str(), "applied input event");
    }

    if !deleted {
        store.save(&pomo.to_record(now))?;
    }
    Ok(pomo.output())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let store = FileStore::at_default_path();
    match run(&store, Event::from_env(), Utc::now()) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
