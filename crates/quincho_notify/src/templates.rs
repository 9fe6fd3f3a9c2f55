// --- File: crates/quincho_notify/src/templates.rs ---
//! Subject and body rendering for reservation emails.

use quincho_common::models::{EmailKind, ReservationEmail};

/// A rendered email ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Render the subject and HTML body for a reservation email.
pub fn render(email: &ReservationEmail) -> RenderedEmail {
    let r = &email.reservation;
    let schedule = format!("{} - {}", r.start_time, r.end_time);

    match email.kind {
        EmailKind::Confirmation => RenderedEmail {
            subject: "Confirmación de reserva del Quincho FIUNA".to_string(),
            html: format!(
                "<h1>Reserva Confirmada</h1>\
                 <p>Hola {responsible},</p>\
                 <p>Tu reserva ha sido confirmada con los siguientes detalles:</p>\
                 <ul>\
                 <li>Fecha: {date}</li>\
                 <li>Hora: {schedule}</li>\
                 <li>Motivo: {reason}</li>\
                 <li>Cantidad de personas: {party_size}</li>\
                 </ul>\
                 <p>Si necesitas hacer cambios, por favor contacta al administrador.</p>\
                 <p>¡Gracias por usar el sistema de reservas del Quincho FIUNA!</p>",
                responsible = r.responsible,
                date = r.date,
                reason = r.reason,
                party_size = r.party_size,
            ),
        },
        EmailKind::Cancellation => RenderedEmail {
            subject: "Cancelación de reserva del Quincho FIUNA".to_string(),
            html: format!(
                "<h1>Reserva Cancelada</h1>\
                 <p>Hola {responsible},</p>\
                 <p>Tu reserva ha sido cancelada:</p>\
                 <ul>\
                 <li>Fecha: {date}</li>\
                 <li>Hora: {schedule}</li>\
                 <li>Motivo: {reason}</li>\
                 </ul>\
                 <p>Motivo de cancelación: {cancellation}</p>\
                 <p>Si tienes alguna pregunta, por favor contacta al administrador.</p>\
                 <p>¡Gracias por usar el sistema de reservas del Quincho FIUNA!</p>",
                responsible = r.responsible,
                date = r.date,
                reason = r.reason,
                cancellation = email
                    .cancellation_reason
                    .as_deref()
                    .unwrap_or("No especificado"),
            ),
        },
        EmailKind::NewReservation => RenderedEmail {
            subject: "Nueva reserva en el Quincho FIUNA".to_string(),
            html: format!(
                "<h1>Nueva Reserva</h1>\
                 <p>Se ha realizado una nueva reserva con los siguientes detalles:</p>\
                 <ul>\
                 <li>Responsable: {responsible}</li>\
                 <li>Email: {email}</li>\
                 <li>Fecha: {date}</li>\
                 <li>Hora: {schedule}</li>\
                 <li>Motivo: {reason}</li>\
                 <li>Cantidad de personas: {party_size}</li>\
                 </ul>\
                 <p>Accede al panel de administración para ver más detalles.</p>",
                responsible = r.responsible,
                email = r.email,
                date = r.date,
                reason = r.reason,
                party_size = r.party_size,
            ),
        },
        EmailKind::Modification => RenderedEmail {
            subject: "Modificación de reserva del Quincho FIUNA".to_string(),
            html: format!(
                "<h1>Reserva Modificada</h1>\
                 <p>Hola {responsible},</p>\
                 <p>Tu reserva ha sido modificada con los siguientes detalles:</p>\
                 <ul>\
                 <li>Fecha: {date}</li>\
                 <li>Hora: {schedule}</li>\
                 <li>Motivo: {reason}</li>\
                 <li>Cantidad de personas: {party_size}</li>\
                 </ul>\
                 <p>Cambios realizados: {changes}</p>\
                 <p>Si tienes alguna pregunta, por favor contacta al administrador.</p>\
                 <p>¡Gracias por usar el sistema de reservas del Quincho FIUNA!</p>",
                responsible = r.responsible,
                date = r.date,
                reason = r.reason,
                party_size = r.party_size,
                changes = email.changes.as_deref().unwrap_or("No especificados"),
            ),
        },
    }
}
