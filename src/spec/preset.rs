//! Built-in metric lists, written in the metric-list language.

/// Default preset: operation throughput, connections, replica state,
/// memory, uptime.
pub const MONGOSTAT: &str = "
serverStatus/opcounters/insert+serverStatus/opcountersRepl/insert,insert,d;
serverStatus/opcounters/query+serverStatus/opcountersRepl/query,query,d;
serverStatus/opcounters/update+serverStatus/opcountersRepl/update,update,d;
serverStatus/opcounters/delete+serverStatus/opcountersRepl/delete,delete,d;
serverStatus/opcounters/getmore+serverStatus/opcountersRepl/getmore,getmore,d;
serverStatus/opcounters/command+serverStatus/opcountersRepl/command,command,d;
serverStatus/connections/current,conn,;
replSetGetStatus/myState,state,;
serverStatus/mem/resident,res_M,;
serverStatus/mem/virtual,vsize_M,;
serverStatus/uptime,uptime,;
";

/// OS-level CPU counters.
pub const CPU: &str = "
systemMetrics/cpu/btime,btime,d;
systemMetrics/cpu/ctxt,ctxt,d;
systemMetrics/cpu/idle_ms,idle,d;
systemMetrics/cpu/iowait_ms,iowait,d;
systemMetrics/cpu/irq_ms,irq,d;
systemMetrics/cpu/nice_ms,nice,d;
systemMetrics/cpu/procs_running,procs_run,;
systemMetrics/cpu/softirq_ms,softirq,d;
systemMetrics/cpu/steal_ms,steal_ms,d;
systemMetrics/cpu/system_ms,system,d;
systemMetrics/cpu/user_ms,user,d;
";

/// OS-level memory counters.
pub const MEM: &str = "
systemMetrics/memory/Active_kb,Active,;
systemMetrics/memory/Buffers_kb,Buffers,;
systemMetrics/memory/Cached_kb,Cached,;
systemMetrics/memory/Dirty_kb,Dirty,;
systemMetrics/memory/Inactive_kb,Inactive,;
systemMetrics/memory/MemFree_kb,MemFree,;
systemMetrics/memory/MemTotal_kb,MemTotal,;
systemMetrics/memory/SwapCached_kb,SwapCached,;
systemMetrics/memory/SwapFree_kb,SwapFree,;
systemMetrics/memory/SwapTotal_kb,SwapTotal,;
";

/// Pick the metric list for a run. Evaluated default -> cpu -> mem ->
/// custom, each later selector unconditionally replacing the prior choice.
pub fn select_spec<'a>(cpu: bool, mem: bool, custom: Option<&'a str>) -> &'a str {
    let mut spec = MONGOSTAT;
    if cpu {
        spec = CPU;
    }
    if mem {
        spec = MEM;
    }
    if let Some(custom) = custom {
        spec = custom;
    }
    spec
}
