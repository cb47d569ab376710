/*!
dispatch.rs - Orchestrator for a single 6502 CPU step (DMA / interrupts / dispatch)

Overview
========
Coordinates a single CPU instruction step:
1. Handles OAM DMA stall (burn 1 cycle; no opcode fetch).
2. Polls the CPU's own NMI/IRQ latches and services whichever fires
   (NMI takes priority; IRQ is dropped, not queued, while IRQ_DISABLE is set).
3. If no interrupt was serviced, commits any `pending_i_flag` staged by the
   previous instruction's CLI/SEI/PLP.
4. Falls back to the match-based fallback dispatcher for opcode execution.

Architecture
============
- Orchestrator: resolves pre-instruction concerns (DMA, interrupts, delayed
  I-flag commit) and delegates instruction execution.
- Fallback dispatcher (`dispatch::fallback::step`): performs opcode fetch,
  family handler chain, and delegates finalization (RMW adjustment + bus tick)
  to `finalize::finalize_and_tick` or directly to `finalize::handle_trivial_or_unknown`
  for NOP / undocumented opcodes.

Cycle Ticking
=============
- DMA & interrupt paths tick cycles directly here.
- Fallback path ticks once in its own finalizer (after RMW adjustment).

Interrupt Latches
==================
The CPU owns `irq_pending`/`nmi_pending`; the bus never intermediates
interrupt delivery. NMI entry costs 8 cycles, IRQ/BRK entry costs 7.

Delayed I-Flag
==============
CLI/SEI/PLP stage their intended IRQ_DISABLE value in `pending_i_flag`
rather than writing `status` directly. This orchestrator commits that
staged value right here, after the interrupt poll for the *current* step
and before the opcode fetch for it — so the very next instruction after
CLI/SEI/PLP still observes the old mask, and only the instruction after
that one sees the new mask (and can be interrupted by it).
*/

#![allow(dead_code)]

use crate::bus::Bus;
pub(crate) mod arithmetic;
pub(crate) mod branches;
pub(crate) mod compare; // extracted compare (CMP/CPX/CPY) opcode family handler
pub(crate) mod control_flow;
mod fallback; // fallback match-based dispatcher
pub(crate) mod finalize; // centralized finalization & trivial/unknown opcode handling
pub(crate) mod load_store; // extracted load/store family handler
pub(crate) mod logical;
pub(crate) mod misc;
pub(crate) mod rmw; // extracted RMW / shift / INC / DEC opcode family handler
use crate::cpu::execute::{get_flag, push_status_with_break, push_word, set_flag};
use crate::cpu::regs::CpuRegs;
use crate::cpu::state::IRQ_DISABLE;

/// Execute one CPU step (including DMA stall / interrupts) and return cycles consumed.
pub(crate) fn step<C: CpuRegs>(cpu: &mut C, bus: &mut Bus) -> u32 {
    // 1. OAM DMA stall: burn one cycle and return (no opcode consumed)
    if bus.dma_is_active() {
        bus.tick(1);
        return 1;
    }

    // 2. Non-maskable interrupt (NMI) - always serviced, regardless of I flag.
    if cpu.nmi_pending() {
        cpu.set_nmi_pending(false);
        log::debug!("servicing NMI, vector $FFFA");
        service_interrupt(cpu, bus, 0xFFFA, 8);
        return 8;
    }

    // 3. Maskable IRQ (line asserted & I flag clear). Dropped, not queued, if masked.
    if cpu.irq_pending() && !get_flag(cpu, IRQ_DISABLE) {
        log::debug!("servicing IRQ, vector $FFFE");
        service_interrupt(cpu, bus, 0xFFFE, 7);
        return 7;
    }

    // 4. No interrupt serviced this step: commit any I-flag CLI/SEI/PLP staged
    // during the previous instruction. This must happen after the poll above
    // (which used the still-stale mask) and before the opcode fetch below.
    if let Some(new_i) = cpu.pending_i_flag() {
        cpu.set_pending_i_flag(None);
        set_flag(cpu, IRQ_DISABLE, new_i);
    }

    // 5. Fallback: fallback dispatcher owns full fetch/decode/execute
    fallback::step(cpu, bus)
}

/// Common interrupt entry sequence (push PC, status with Break=0; set I; load vector).
fn service_interrupt<C: CpuRegs>(cpu: &mut C, bus: &mut Bus, vector_addr: u16, total_cycles: u32) {
    // Push current PC
    let current_pc = cpu.pc();
    push_word(cpu, bus, current_pc);
    // Push processor status with Break flag cleared
    push_status_with_break(cpu, bus, false);
    // Set Interrupt Disable immediately; interrupt entry is not subject to
    // the CLI/SEI/PLP delayed-commit rule.
    set_flag(cpu, IRQ_DISABLE, true);
    // Load new PC from vector
    let new_pc = bus.read_word(vector_addr);
    cpu.set_pc(new_pc);
    bus.tick(total_cycles);
}
