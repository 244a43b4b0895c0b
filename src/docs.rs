use crate::api::attendance::CheckInReq;
use crate::model::attendance::{AttendanceDetail, AttendanceRecord};
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::shift::{Shift, ShiftWithWorker};
use crate::model::user::WorkerSummary;
use crate::models::{LoginReqDto, RegisterReq};
use crate::service::aggregate::{Activity, DailyStatus, DashboardSnapshot, Status, WorkerMonthlySummary};
use crate::service::ledger::WorkerMonthly;
use crate::service::registry::{CreateShift, ShiftFilter, UpdateShift};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftgate API",
        version = "1.0.0",
        description = r#"
## Shift scheduling & QR attendance

Administrators schedule shifts; each shift carries a single-use check-in
token rendered as a QR code. Workers scan the token to record a verified
check-in, accepted any time on the scheduled calendar day.

### Key Features
- **Shift Management** — create, update, deactivate and list shifts
- **QR Check-In** — one check-in per shift, token bound to one worker
- **Attendance Views** — daily listing, monthly grouping, present/late/absent roll-up
- **Dashboard** — live counts and recent activity for admins
- **Notifications** — in-app feed, daily reminders, monthly admin report

### Security
Protected endpoints use **JWT Bearer authentication**. Shift management and
attendance reporting require the **admin** role; check-in requires **worker**.

### Response Format
`{"status": "success", "data": ...}` on success;
`{"status": "fail"|"error", "message": ...}` on failure.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::update_shift,
        crate::api::shift::deactivate_shift,
        crate::api::shift::delete_shift,

        crate::api::attendance::check_in,
        crate::api::attendance::history,
        crate::api::attendance::daily,
        crate::api::attendance::daily_status,
        crate::api::attendance::monthly,
        crate::api::attendance::monthly_summary,

        crate::api::dashboard::stats,

        crate::api::notification::list,
        crate::api::notification::mark_read,
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            Role,
            Shift,
            ShiftWithWorker,
            CreateShift,
            UpdateShift,
            ShiftFilter,
            CheckInReq,
            AttendanceRecord,
            AttendanceDetail,
            WorkerSummary,
            WorkerMonthly,
            Status,
            DailyStatus,
            WorkerMonthlySummary,
            DashboardSnapshot,
            Activity,
            Notification
        )
    ),
    tags(
        (name = "Auth", description = "Account registration and session APIs"),
        (name = "Shift", description = "Shift scheduling APIs"),
        (name = "Attendance", description = "Check-in and attendance reporting APIs"),
        (name = "Dashboard", description = "Admin dashboard APIs"),
        (name = "Notification", description = "In-app notification APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
