use crate::{
    api::{attendance, leave, reference, reports, staff},
    config::Config,
    model::{
        Client, Department, Designation, Feedback, Holiday, LeaveType, Overtime, Position,
        PositionType, Project, Shift, ShiftProfile, StaffType, VisaType, WorkLocation,
    },
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build the API limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let api = web::scope(&config.api_prefix)
        .service(
            web::scope("/attendance")
                // /attendance
                .service(
                    web::resource("")
                        .route(web::get().to(attendance::list_attendance))
                        .route(web::delete().to(attendance::delete_all_attendance)),
                )
                .service(web::resource("/clock-in").route(web::post().to(attendance::clock_in)))
                .service(
                    web::resource("/clock-in-many").route(web::post().to(attendance::clock_in_many)),
                )
                .service(
                    web::resource("/clock-out-many")
                        .route(web::post().to(attendance::clock_out_many)),
                )
                // /attendance/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(attendance::get_attendance))
                        .route(web::put().to(attendance::update_attendance))
                        .route(web::delete().to(attendance::delete_attendance)),
                )
                // /attendance/{id}/clock-out
                .service(
                    web::resource("/{id}/clock-out").route(web::post().to(attendance::clock_out)),
                ),
        )
        .service(
            web::scope("/leave")
                // /leave
                .service(
                    web::resource("")
                        .route(web::get().to(leave::list_leave))
                        .route(web::post().to(leave::create_leave))
                        .route(web::delete().to(leave::delete_all_leave)),
                )
                // /leave/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(leave::get_leave))
                        .route(web::put().to(leave::update_leave))
                        .route(web::delete().to(leave::delete_leave)),
                ),
        )
        .service(
            web::scope("/staff")
                .service(
                    web::resource("")
                        .route(web::get().to(staff::list_staff))
                        .route(web::post().to(staff::create_staff)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(staff::get_staff))
                        .route(web::put().to(staff::update_staff))
                        .route(web::delete().to(staff::delete_staff)),
                ),
        )
        // lookup entities
        .service(reference::coded_scope::<Department>("/departments"))
        .service(reference::scope::<Designation>("/designations"))
        .service(reference::scope::<Shift>("/shifts"))
        .service(reference::scope::<Holiday>("/holidays"))
        .service(reference::coded_scope::<LeaveType>("/leave-types"))
        .service(reference::scope::<Client>("/clients"))
        .service(reference::scope::<Project>("/projects"))
        .service(reference::scope::<Position>("/positions"))
        .service(reference::scope::<PositionType>("/position-types"))
        .service(reference::scope::<WorkLocation>("/work-locations"))
        .service(reference::scope::<VisaType>("/visa-types"))
        .service(reference::scope::<StaffType>("/staff-types"))
        .service(reference::staff_category_scope("/staff-categories"))
        .service(reference::scope::<Overtime>("/overtimes"))
        .service(reference::scope::<Feedback>("/feedbacks"))
        .service(reference::scope::<ShiftProfile>("/shift-profiles"))
        .service(
            web::resource("/reports/attendance-summary")
                .route(web::get().to(reports::attendance_summary)),
        )
        .service(web::resource("/dashboard").route(web::get().to(reports::dashboard)));

    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(api.wrap(Arc::new(limiter))),
        None => {
            tracing::warn!(
                rate = config.rate_protected_per_min,
                "Invalid rate limit, serving without a limiter"
            );
            cfg.service(api)
        }
    };
}
