//! Expense deletion endpoint.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    alert::Alert,
    app_state::MutationState,
    coordinator::{DeleteConfirmation, MutationCoordinator},
    expense::ExpenseId,
};

/// Deleting requires `confirmed=true`, which the page only sends after asking the user.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DeleteQuery {
    pub confirmed: bool,
}

/// Handle expense deletion. Returns a success alert or an error alert.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<MutationState>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let coordinator = MutationCoordinator::new(&state.backend, &state.dashboard_config);

    match coordinator.delete(
        &state.session,
        expense_id,
        DeleteConfirmation::from(query.confirmed),
    ) {
        Ok(()) => Alert::SuccessSimple {
            message: "Gasto eliminado".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use crate::{
        app_state::{MutationState, test_states::test_states},
        backend::ExpenseBackend,
        session::{FetchKey, fetch, lock_session},
        test_utils::{
            assert_alert_message, assert_valid_html, get_header, insert_expense,
            parse_html_fragment,
        },
    };

    use super::{DeleteQuery, delete_expense_endpoint};

    fn seed(state: &MutationState) {
        insert_expense(&state.backend, 1, 2024, 1, 1_000);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_expense_everywhere() {
        let (_, state) = test_states();
        seed(&state);
        fetch(&state.session, &state.backend, FetchKey::AllExpenses).unwrap();

        let response = delete_expense_endpoint(
            Path(1),
            State(state.clone()),
            Query(DeleteQuery { confirmed: true }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_alert_message(&html, "Gasto eliminado");
        assert!(state.backend.expenses(None).unwrap().is_empty());
        assert_eq!(
            lock_session(&state.session).unwrap().all_expenses(),
            Some(&[][..])
        );
    }

    #[tokio::test]
    async fn unconfirmed_delete_keeps_expense() {
        let (_, state) = test_states();
        seed(&state);

        let response = delete_expense_endpoint(
            Path(1),
            State(state.clone()),
            Query(DeleteQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Eliminación no confirmada");
        assert_eq!(state.backend.expenses(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_expense_returns_error_html() {
        let (_, state) = test_states();

        let response = delete_expense_endpoint(
            Path(99),
            State(state),
            Query(DeleteQuery { confirmed: true }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_alert_message(&html, "No se pudo eliminar el gasto");
    }
}
