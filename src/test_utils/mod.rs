#![allow(missing_docs)]

mod expense;
mod form;
mod html;
mod http;

pub(crate) use expense::{expense, insert_expense};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_hx_endpoint, must_get_form, selected_option,
};
pub(crate) use html::{
    assert_alert_message, assert_valid_html, element_texts, expense_row_ids, parse_html_document,
    parse_html_fragment,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect, get_header};
