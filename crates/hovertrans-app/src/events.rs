use hovertrans_config::ConfigPatch;
use hovertrans_types::HostEvent;

use crate::orchestrator::TooltipContent;
use crate::timer::TimerId;

/// Everything the trigger controller reacts to
#[derive(Debug)]
pub enum SessionEvent {
    Host(HostEvent),
    ConfigChanged(ConfigPatch),
    TimerFired(TimerId),
    CycleFinished {
        cycle: u64,
        content: TooltipContent,
    },
}
