use std::sync::Arc;

use actix_web::web::{self, Data};

use crate::notify::{ChannelTransport, EventBus, NotificationFanout, PresenceRegistry};
use crate::service::{AttendanceAggregator, ClockStore, PayrollLedger};
use crate::store::{AttendanceStore, EmployeeDirectory, PayrollStore};
use crate::time::TimeSource;

/// The wired attendance/payroll/notification core, shared by all workers.
#[derive(Clone)]
pub struct Core {
    pub bus: Arc<EventBus>,
    pub presence: Data<PresenceRegistry>,
    pub transport: Data<ChannelTransport>,
    pub clock: Data<ClockStore>,
    pub stats: Data<AttendanceAggregator>,
    pub payroll: Data<PayrollLedger>,
}

impl Core {
    pub fn build<S>(store: Arc<S>, time: Arc<dyn TimeSource>) -> Self
    where
        S: AttendanceStore + PayrollStore + EmployeeDirectory + 'static,
    {
        let bus = Arc::new(EventBus::new());
        let presence = Arc::new(PresenceRegistry::new());
        let transport = Arc::new(ChannelTransport::new());

        NotificationFanout::new(presence.clone(), transport.clone()).install(&bus);

        let clock = ClockStore::new(store.clone(), store.clone(), bus.clone(), time.clone());
        let stats = AttendanceAggregator::new(store.clone(), store.clone(), time.clone());
        let payroll = PayrollLedger::new(store.clone(), store, bus.clone(), time);

        Self {
            bus,
            presence: Data::from(presence),
            transport: Data::from(transport),
            clock: Data::new(clock),
            stats: Data::new(stats),
            payroll: Data::new(payroll),
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.presence.clone())
            .app_data(self.transport.clone())
            .app_data(self.clock.clone())
            .app_data(self.stats.clone())
            .app_data(self.payroll.clone());
    }
}
