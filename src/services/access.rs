// src/services/access.rs
//
// Portão de acesso: todo detalhe/edição/remoção/movimentação de um medicamento
// buscado por id passa por aqui antes de qualquer escrita.

use uuid::Uuid;

use crate::{common::error::AppError, models::medicine::Medicine};

pub fn authorize(user_id: Uuid, medicine: &Medicine) -> Result<(), AppError> {
    if medicine.user_id != user_id {
        tracing::warn!(%user_id, medicine_id = %medicine.id, "🚫 Acesso negado a medicamento de outro usuário");
        return Err(AppError::AccessDenied);
    }
    Ok(())
}

/// Resultado de uma busca por id: ausente vira 404, de outro dono vira AccessDenied.
pub fn require_owned(found: Option<Medicine>, user_id: Uuid) -> Result<Medicine, AppError> {
    let medicine = found.ok_or(AppError::MedicineNotFound)?;
    authorize(user_id, &medicine)?;
    Ok(medicine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::medicine::fixtures::medicine;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sample() -> Medicine {
        medicine(10, Decimal::ONE, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap())
    }

    #[test]
    fn owner_is_allowed() {
        let m = sample();
        assert!(authorize(m.user_id, &m).is_ok());
        assert!(require_owned(Some(m.clone()), m.user_id).is_ok());
    }

    #[test]
    fn other_user_is_denied() {
        let m = sample();
        assert!(matches!(authorize(Uuid::new_v4(), &m), Err(AppError::AccessDenied)));
        assert!(matches!(require_owned(Some(m), Uuid::new_v4()), Err(AppError::AccessDenied)));
    }

    #[test]
    fn missing_is_not_found() {
        assert!(matches!(require_owned(None, Uuid::new_v4()), Err(AppError::MedicineNotFound)));
    }
}
