pub mod cancellation;
pub mod gateway;
pub mod directory;
pub mod slots;
pub mod draft;
pub mod submission;
pub mod payment;
pub mod lifecycle;
pub mod session;

pub use cancellation::CancellationToken;
pub use gateway::{BookingBackend, HttpBookingBackend};
pub use directory::DirectoryService;
pub use slots::{SlotBoard, SlotReconciliationService, SlotView};
pub use draft::BookingDraft;
pub use submission::BookingSubmissionService;
pub use payment::{
    CardDetails, PaymentConfirmation, PaymentDescriptor, PaymentMethod, PaymentProcessor,
    SimulatedPaymentProcessor,
};
pub use lifecycle::AppointmentLifecycleService;
pub use session::{BookedCallback, BookingPhase, BookingSession};
