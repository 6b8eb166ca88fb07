// libs/booking-cell/src/services/session.rs
use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::auth::AuthSession;

use crate::models::{
    Appointment, BookingCommand, BookingError, BookingMode, BookingReceipt, BookingStep,
    DoctorSummary, PatientSummary, PaymentStatus, MSG_PAYMENT_FAILED,
};
use crate::services::cancellation::CancellationToken;
use crate::services::directory::DirectoryService;
use crate::services::draft::BookingDraft;
use crate::services::gateway::BookingBackend;
use crate::services::payment::{PaymentConfirmation, PaymentDescriptor, PaymentProcessor};
use crate::services::slots::{SlotBoard, SlotReconciliationService};
use crate::services::submission::BookingSubmissionService;

/// Invoked once per confirmed booking so the caller can refresh its lists.
pub type BookedCallback = Box<dyn Fn(&BookingReceipt) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum BookingPhase {
    Closed,
    Editing,
    /// Appointment exists, bill does not. Only `retry_bill` moves on from here.
    PartiallyCommitted {
        appointment: Appointment,
        command: BookingCommand,
    },
    AwaitingPayment {
        receipt: BookingReceipt,
    },
}

/// One booking dialog: the draft, the single error banner, the busy flag and
/// the phase the booking has reached.
///
/// Every failure is turned into the banner text as well as returned, except
/// cancellation, which is silent.
///
/// Every operation takes `&mut self`, so the borrow alone keeps one session
/// from running two calls at once. `busy` is bookkeeping for `is_busy` and
/// `Debug`, never a guard.
pub struct BookingSession {
    auth: AuthSession,
    mode: BookingMode,
    window_days: i64,
    today: Option<NaiveDate>,
    directory: DirectoryService,
    slots: SlotReconciliationService,
    submission: BookingSubmissionService,
    payment: Arc<dyn PaymentProcessor>,
    draft: BookingDraft,
    phase: BookingPhase,
    doctors: Vec<DoctorSummary>,
    patients: Vec<PatientSummary>,
    busy: bool,
    error: Option<String>,
    cancel: CancellationToken,
    on_booked: Option<BookedCallback>,
}

impl fmt::Debug for BookingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingSession")
            .field("auth", &self.auth)
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("draft", &self.draft)
            .field("busy", &self.busy)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// The calendar day as the user sees it, not as UTC does.
fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl BookingSession {
    pub fn new(
        auth: AuthSession,
        backend: Arc<dyn BookingBackend>,
        payment: Arc<dyn PaymentProcessor>,
        config: &AppConfig,
    ) -> Result<Self, BookingError> {
        let mode = BookingMode::for_role(auth.role)?;
        let window_days = config.booking_window_days;

        Ok(Self {
            auth,
            mode,
            window_days,
            today: None,
            directory: DirectoryService::new(Arc::clone(&backend)),
            slots: SlotReconciliationService::new(Arc::clone(&backend)),
            submission: BookingSubmissionService::new(backend),
            payment,
            draft: BookingDraft::new(mode, local_today(), window_days),
            phase: BookingPhase::Closed,
            doctors: Vec::new(),
            patients: Vec::new(),
            busy: false,
            error: None,
            cancel: CancellationToken::new(),
            on_booked: None,
        })
    }

    /// Pin "today" instead of reading the clock when the dialog opens.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn on_booked(mut self, callback: BookedCallback) -> Self {
        self.on_booked = Some(callback);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(local_today)
    }

    // ==========================================================================
    // DIALOG LIFECYCLE
    // ==========================================================================

    pub fn open(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.draft = BookingDraft::new(self.mode, self.today(), self.window_days);
        self.phase = BookingPhase::Editing;
        self.doctors.clear();
        self.patients.clear();
        self.busy = false;
        self.error = None;
        debug!("Booking dialog opened in {:?} mode", self.mode);
    }

    /// Drop everything and abandon any call still in flight.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.draft = BookingDraft::new(self.mode, self.today(), self.window_days);
        self.phase = BookingPhase::Closed;
        self.doctors.clear();
        self.patients.clear();
        self.busy = false;
        self.error = None;
        debug!("Booking dialog closed");
    }

    /// A handle another task can use to abandon whatever this session is awaiting.
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ==========================================================================
    // ACCESSORS
    // ==========================================================================

    pub fn mode(&self) -> BookingMode {
        self.mode
    }

    pub fn phase(&self) -> &BookingPhase {
        &self.phase
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn doctors(&self) -> &[DoctorSummary] {
        &self.doctors
    }

    pub fn patients(&self) -> &[PatientSummary] {
        &self.patients
    }

    pub fn filtered_patients(&self, query: &str) -> Vec<&PatientSummary> {
        DirectoryService::filter_patients(&self.patients, query)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn current_step(&self) -> BookingStep {
        self.draft.current_step()
    }

    pub fn slot_board(&self) -> Option<SlotBoard> {
        self.draft
            .availability()
            .map(|availability| SlotBoard::render(&availability.slots))
    }

    pub fn can_submit(&self) -> bool {
        self.phase == BookingPhase::Editing && !self.busy && self.draft.is_ready()
    }

    /// Name printed on the payment form.
    pub fn cardholder_name(&self) -> String {
        match self.mode {
            BookingMode::Receptionist => self
                .draft
                .patient()
                .map(|patient| patient.name.clone())
                .unwrap_or_default(),
            BookingMode::Patient => self.auth.name.clone(),
        }
    }

    fn fail<T>(&mut self, err: BookingError) -> Result<T, BookingError> {
        if err != BookingError::Cancelled {
            self.error = Some(err.to_string());
        }
        Err(err)
    }

    fn ensure_editing(&mut self) -> Result<(), BookingError> {
        match self.phase {
            BookingPhase::Editing => Ok(()),
            BookingPhase::Closed => {
                self.fail(BookingError::InvalidState("Booking dialog is not open".to_string()))
            }
            BookingPhase::PartiallyCommitted { .. } => self.fail(BookingError::InvalidState(
                "Appointment already booked; retry creating the bill".to_string(),
            )),
            BookingPhase::AwaitingPayment { .. } => self.fail(BookingError::InvalidState(
                "Booking is awaiting payment".to_string(),
            )),
        }
    }

    // ==========================================================================
    // SELECTION
    // ==========================================================================

    pub async fn load_directory(&mut self) -> Result<(), BookingError> {
        self.ensure_editing()?;
        let cancel = self.cancel.clone();

        self.busy = true;
        let doctors = cancel.run(self.directory.list_doctors(self.mode, &self.auth)).await;
        self.busy = false;

        match doctors {
            None => return Err(BookingError::Cancelled),
            Some(Ok(doctors)) => self.doctors = doctors,
            Some(Err(e)) => {
                warn!("Failed to load doctors: {}", e);
                return self.fail(BookingError::Backend(e.user_message("Failed to load doctors.")));
            }
        }

        if self.mode == BookingMode::Receptionist {
            self.busy = true;
            let patients = cancel.run(self.directory.list_patients(&self.auth)).await;
            self.busy = false;

            match patients {
                None => return Err(BookingError::Cancelled),
                Some(Ok(patients)) => self.patients = patients,
                Some(Err(e)) => {
                    warn!("Failed to load patients: {}", e);
                    return self
                        .fail(BookingError::Backend(e.user_message("Failed to load patients.")));
                }
            }
        }

        Ok(())
    }

    pub fn select_patient(&mut self, patient_id: &str) -> Result<(), BookingError> {
        self.ensure_editing()?;

        let found = self.patients.iter().find(|p| p.id == patient_id).cloned();
        let patient = match found {
            Some(patient) => patient,
            None => {
                return self.fail(BookingError::InvalidState(format!(
                    "Unknown patient {}",
                    patient_id
                )))
            }
        };

        match self.draft.select_patient(patient) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    pub fn select_doctor(&mut self, doctor_id: &str) -> Result<(), BookingError> {
        self.ensure_editing()?;

        let found = self.doctors.iter().find(|d| d.id == doctor_id).cloned();
        match found {
            Some(doctor) => {
                self.draft.select_doctor(doctor);
                Ok(())
            }
            None => self.fail(BookingError::InvalidState(format!("Unknown doctor {}", doctor_id))),
        }
    }

    /// Pick a date and load its slots.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.ensure_editing()?;

        if let Err(e) = self.draft.select_date(date) {
            return self.fail(e);
        }

        let doctor_id = match self.draft.doctor() {
            Some(doctor) => doctor.id.clone(),
            None => return self.fail(BookingError::InvalidState("Select a doctor first".to_string())),
        };
        let cancel = self.cancel.clone();

        self.busy = true;
        let fetched = self.slots.fetch(&doctor_id, date, &self.auth, &cancel).await;
        self.busy = false;

        match fetched {
            Some(availability) => {
                self.draft.apply_availability(availability);
                Ok(())
            }
            None => Err(BookingError::Cancelled),
        }
    }

    pub fn select_time(&mut self, label: &str) -> Result<(), BookingError> {
        self.ensure_editing()?;
        match self.draft.select_time(label) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    pub fn set_reason(&mut self, reason: &str) -> Result<(), BookingError> {
        self.ensure_editing()?;
        self.draft.set_reason(reason);
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<(), BookingError> {
        self.ensure_editing()?;
        self.draft.set_notes(notes);
        Ok(())
    }

    // ==========================================================================
    // SUBMISSION
    // ==========================================================================

    pub async fn submit(&mut self) -> Result<BookingReceipt, BookingError> {
        self.ensure_editing()?;

        let command = match self.draft.validate() {
            Ok(command) => command,
            Err(e) => return self.fail(e),
        };

        let cancel = self.cancel.clone();
        self.error = None;

        self.busy = true;
        let result = self.submission.submit(&command, &self.auth, &cancel).await;
        self.busy = false;

        match result {
            Ok(receipt) => {
                self.phase = BookingPhase::AwaitingPayment {
                    receipt: receipt.clone(),
                };
                Ok(receipt)
            }
            Err(BookingError::BillCreation { appointment, reason }) => {
                self.phase = BookingPhase::PartiallyCommitted {
                    appointment: (*appointment).clone(),
                    command,
                };
                self.fail(BookingError::BillCreation { appointment, reason })
            }
            Err(e) => self.fail(e),
        }
    }

    /// Re-send only the bill for an appointment that already exists.
    pub async fn retry_bill(&mut self) -> Result<BookingReceipt, BookingError> {
        let (appointment, command) = match &self.phase {
            BookingPhase::PartiallyCommitted { appointment, command } => {
                (appointment.clone(), command.clone())
            }
            _ => {
                return self.fail(BookingError::InvalidState(
                    "No booking is waiting for its bill".to_string(),
                ))
            }
        };

        info!("Retrying bill creation for appointment {}", appointment.id);
        // A retry is a new request; an earlier cancellation must not swallow it.
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        let cancel = self.cancel.clone();
        self.error = None;

        self.busy = true;
        let result = self
            .submission
            .create_bill(&command, &appointment, &self.auth, &cancel)
            .await;
        self.busy = false;

        match result {
            Ok(bill) => {
                let receipt = BookingReceipt { appointment, bill };
                self.phase = BookingPhase::AwaitingPayment {
                    receipt: receipt.clone(),
                };
                Ok(receipt)
            }
            Err(e) => self.fail(e),
        }
    }

    // ==========================================================================
    // PAYMENT
    // ==========================================================================

    /// Run the payment step. On success the bill is marked paid, the booked
    /// callback fires and the dialog closes.
    pub async fn confirm_payment(
        &mut self,
        descriptor: &PaymentDescriptor,
    ) -> Result<PaymentConfirmation, BookingError> {
        let mut receipt = match &self.phase {
            BookingPhase::AwaitingPayment { receipt } => receipt.clone(),
            _ => {
                return self.fail(BookingError::InvalidState(
                    "Nothing is awaiting payment".to_string(),
                ))
            }
        };

        let cancel = self.cancel.clone();
        self.error = None;

        self.busy = true;
        let result = cancel.run(self.payment.process(descriptor, &receipt.bill)).await;
        self.busy = false;

        let confirmation = match result {
            None => return Err(BookingError::Cancelled),
            Some(Ok(confirmation)) => confirmation,
            Some(Err(e)) => {
                warn!("Payment failed for appointment {}: {}", receipt.appointment.id, e);
                return self.fail(BookingError::Payment(MSG_PAYMENT_FAILED.to_string()));
            }
        };

        receipt.bill.payment_status = PaymentStatus::Paid;
        info!(
            "Booking confirmed: appointment {} paid ({})",
            receipt.appointment.id, confirmation.transaction_id
        );

        if let Some(callback) = &self.on_booked {
            callback(&receipt);
        }

        self.close();
        Ok(confirmation)
    }
}
