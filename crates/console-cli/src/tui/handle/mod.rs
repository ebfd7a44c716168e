use super::*;

mod dashboard;
mod dispatch;
mod forms;
mod login;

use forms::edit_field;
