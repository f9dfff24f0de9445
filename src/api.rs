pub mod swagger_main;
pub mod todo_item;

#[cfg(test)]
pub mod test_util;
