//! Node component simulates the market side of a fog node: it commits the resources won in an
//! auction and gives them back when the SLA duration is over.

use std::cell::RefCell;
use std::rc::Rc;

use dslab_core::{cast, log_debug, Event, EventHandler, SimulationContext};

use crate::core::common::{FunctionId, NodeId, SimComponentId};
use crate::core::events::{ProvisionRequest, ReleaseResources};
use crate::core::sla::Sla;
use crate::core::topology::Topology;
use crate::metrics::collector::{EarningRecord, FailureReason, Monitoring};

pub struct FogNodeComponent {
    ctx: SimulationContext,
    node_id: NodeId,
    topology: Rc<RefCell<Topology>>,
    monitoring: Rc<RefCell<Monitoring>>,
}

impl FogNodeComponent {
    pub fn new(
        ctx: SimulationContext,
        node_id: NodeId,
        topology: Rc<RefCell<Topology>>,
        monitoring: Rc<RefCell<Monitoring>>,
    ) -> Self {
        Self {
            ctx,
            node_id,
            topology,
            monitoring,
        }
    }

    pub fn id(&self) -> SimComponentId {
        self.ctx.id()
    }

    fn provision(
        &mut self,
        function_id: FunctionId,
        sla: Sla,
        price: f64,
        accumulated_latency: f64,
        time: f64,
    ) {
        let mut topology = self.topology.borrow_mut();
        let node = topology.node_mut(self.node_id);
        if !node.provision(function_id, &sla, price, time) {
            log_debug!(
                self.ctx,
                "function {} does not fit anymore, cores used {}/{}",
                function_id,
                node.cores_used,
                node.cores
            );
            self.monitoring.borrow_mut().record_failure(
                function_id,
                time,
                FailureReason::RaceLostAtCommit,
            );
            return;
        }

        self.monitoring.borrow_mut().record_provisioned(EarningRecord {
            function_id,
            node: node.name.clone(),
            level: node.level,
            price,
            accumulated_latency,
            sla_latency: sla.latency,
            start_time: time,
            end_time: time + sla.duration,
            cpu_reserved: sla.core,
            node_total_cpu: node.cores,
            mem_reserved: sla.mem,
        });
        log_debug!(
            self.ctx,
            "function {} provisioned for {}, cores used {}/{}",
            function_id,
            sla.duration,
            node.cores_used,
            node.cores
        );
        self.ctx
            .emit_self(ReleaseResources { function_id }, sla.duration);
    }

    fn release(&mut self, function_id: FunctionId) {
        let released = self
            .topology
            .borrow_mut()
            .node_mut(self.node_id)
            .release(function_id);
        match released {
            Some(_) => {
                self.monitoring.borrow_mut().record_released();
                log_debug!(self.ctx, "function {} released", function_id);
            }
            None => panic!(
                "Function {} is not provisioned on node {}",
                function_id, self.node_id
            ),
        }
    }
}

impl EventHandler for FogNodeComponent {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            ProvisionRequest {
                function_id,
                sla,
                price,
                accumulated_latency,
            } => {
                self.provision(function_id, sla, price, accumulated_latency, event.time);
            }
            ReleaseResources { function_id } => {
                self.release(function_id);
            }
        });
    }
}
