pub mod borrow_flow;
