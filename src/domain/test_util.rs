use crate::domain::todo_item::driven_ports::Clock;
use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Mutex;

/// Connectivity represents the "connected" state of a mocked driven port and provides
/// common behavior for returning an error if the port is configured to be in a disconnected state.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Return an error if connectivity is in a "disconnected" state
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to the database!")),
        }
    }
}

/// Clock which starts at a fixed instant and advances one second every time it's read,
/// so consecutive mutations always get distinct, increasing timestamps.
pub struct FakeClock {
    next_reading: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new() -> FakeClock {
        FakeClock::starting_at(test_epoch())
    }

    pub fn starting_at(start: DateTime<Utc>) -> FakeClock {
        FakeClock {
            next_reading: Mutex::new(start),
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next_reading = self.next_reading.lock().expect("fake clock mutex poisoned");
        let reading = *next_reading;
        *next_reading = reading + TimeDelta::seconds(1);

        reading
    }
}

/// The instant every [FakeClock::new] starts from
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("test epoch should be a valid timestamp")
}

/// FakeImplementation is a quick drop-in property that helps mock a function and capture
/// arguments the function is called with. It's useful for mocking async functions since
/// popular rust mocking tools don't work well with async functions on traits.
///
/// * [Args] represents the arguments passed to the function that should be captured on a call
/// * [Ret] represents the type of the function's return value
///
/// Mocks wrap themselves in a [Mutex] so the trait's `&self` methods can record calls:
///
/// ```ignore
/// impl TodoItemPort for Mutex<MockTodoItemService> {
///     async fn toggle_item(&self, item_id: i32, /* ports */) -> Result<TodoItem, TodoItemError> {
///         let mut locked_self = self.lock().unwrap();
///         locked_self.toggle_item_result.save_arguments(item_id);
///         locked_self.toggle_item_result.return_value_result()
///     }
/// }
/// ```
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    /// Creates a new FakeImplementation
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Saves arguments from a single invocation of the FakeImplementation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Returns the list of arguments passed on every call to this FakeImplementation
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    /// Set the result that should be returned when this FakeImplementation is invoked
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value)
    }

    /// Retrieve the result that should be returned when this FakeImplementation is invoked (for [Result]s)
    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(err.clone()),
            None => panic!("Tried to return from a function where the return value wasn't set!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_ticks_forward() {
        let clock = FakeClock::new();

        let first = clock.now();
        let second = clock.now();

        assert_eq!(test_epoch(), first);
        assert_eq!(first + TimeDelta::seconds(1), second);
    }
}
