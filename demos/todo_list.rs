//! Watched state driving a render loop, the way a UI binding consumes it

use partyline::Watched;

#[derive(Clone, Debug)]
struct TodoItem {
    title: String,
    completed: bool,
}

#[derive(Clone, Debug)]
struct AppState {
    todos: Vec<TodoItem>,
}

impl AppState {
    fn new() -> Self {
        Self { todos: Vec::new() }
    }

    fn add_todo(&mut self, title: &str) {
        self.todos.push(TodoItem {
            title: title.to_string(),
            completed: false,
        });
    }

    fn toggle_todo(&mut self, index: usize) {
        if let Some(todo) = self.todos.get_mut(index) {
            todo.completed = !todo.completed;
        }
    }

    fn stats(&self) -> (usize, usize) {
        let done = self.todos.iter().filter(|t| t.completed).count();
        (self.todos.len(), done)
    }
}

fn render(state: &AppState) {
    for todo in &state.todos {
        let status = if todo.completed { "✓" } else { " " };
        println!("   [{}] {}", status, todo.title);
    }
    let (total, done) = state.stats();
    println!("   -- {done}/{total} done");
}

fn main() {
    println!("=== Watched Example: Todo List ===\n");

    println!("1. Creating the state");
    let state = Watched::new(AppState::new());

    println!("\n2. Mounting the 'component': read once, then subscribe");
    state.read(render);
    let sub = state.subscribe(|state: &AppState| {
        println!("   [re-render]");
        render(state);
    });

    println!("\n3. Adding todos (each update re-renders synchronously)");
    state.update(|s| s.add_todo("Learn Rust"));
    state.update(|s| s.add_todo("Wire up the store"));
    state.update(|s| s.add_todo("Ship it"));

    println!("\n4. Completing the first todo");
    state.update(|s| s.toggle_todo(0));

    println!("\n5. Unmounting: unsubscribe, further updates render nothing");
    sub.unsubscribe();
    state.update(|s| s.toggle_todo(1));

    println!("\n6. Final state:");
    state.read(render);

    println!("\n✓ Example complete!");
}
