//! i3blocks 鼠标事件：每次调用最多消费一个 `BLOCK_BUTTON` 代码

/// i3blocks 注入的鼠标按键环境变量
pub const BLOCK_BUTTON_VAR: &str = "BLOCK_BUTTON";

/// 单次调用的输入事件
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// 左键：暂停 / 继续
    TogglePause,
    /// 中键：重置回初始状态
    Reset,
    /// 右键：进入下一阶段（当前周期已结束时）
    NextPeriod,
    /// 滚轮上：提前 1 分钟结束
    Shorten,
    /// 滚轮下：推迟 1 分钟结束
    Prolong,
}

impl Event {
    /// 解析事件代码；未识别的代码一律当无事件，不是错误
    /// （宿主将来发新代码也不至于把 blocklet 打挂）
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::TogglePause),
            "2" => Some(Self::Reset),
            "3" => Some(Self::NextPeriod),
            "4" => Some(Self::Shorten),
            "5" => Some(Self::Prolong),
            _ => None,
        }
    }

    /// 从环境变量读取本次调用的事件
    pub fn from_env() -> Option<Self> {
        std::env::var(BLOCK_BUTTON_VAR)
            .ok()
            .and_then(|code| Self::from_code(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_codes_map_to_events() {
        assert_eq!(Event::from_code("1"), Some(Event::TogglePause));
        assert_eq!(Event::from_code("2"), Some(Event::Reset));
        assert_eq!(Event::from_code("3"), Some(Event::NextPeriod));
        assert_eq!(Event::from_code("4"), Some(Event::Shorten));
        assert_eq!(Event::from_code("5"), Some(Event::Prolong));
    }

    #[test]
    fn unknown_codes_are_noop() {
        assert_eq!(Event::from_code(""), None);
        assert_eq!(Event::from_code("6"), None);
        assert_eq!(Event::from_code("left"), None);
    }
}
