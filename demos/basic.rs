use gridcast::{GridMode, OccupancyGrid, PlanOptions, Raytracer};

const SIZE: usize = 6;

fn main() {
    env_logger::init();

    // A 6x6 grid with a wall across x = 3, open at y = 4:
    //
    //   y=5 | . . . # . . |
    //   y=4 | . . . . . . |
    //   y=3 | . . . # . . |
    //   y=2 | . . . # . . |
    //   y=1 | . . . # . . |
    //   y=0 | . . . # . . |
    let grid = OccupancyGrid::from_fn(&[SIZE, SIZE], 1, |cell| cell[0] == 3 && cell[1] != 4)
        .unwrap();

    // Trace a raw ray, ignoring occupancy.
    let mut ray = Raytracer::new(2, &[0.5, 0.5], &[4.5, 2.5]).unwrap();
    let mut cells: Vec<_> = ray.trace().into_iter().collect();
    cells.sort();
    println!("ray sweeps {cells:?}");

    // Sweep the same ray as a corridor: the wall cuts it short.
    let corridor = grid.cartograph(&[0.5, 0.5], &[4.5, 2.5]).unwrap();
    println!(
        "corridor success={} cells={:?} error={:?}",
        corridor.success, corridor.traversed_cells, corridor.error
    );

    // Plan around the wall instead.
    let plan = grid
        .plan_path(&[0, 0], &[5, 0], &PlanOptions::default())
        .unwrap();
    println!(
        "plan complete={} ({} nodes expanded)",
        plan.complete, plan.expanded_nodes
    );
    for position in &plan.path {
        println!("  {position:?}");
    }

    // Vertex-mode planning walks the lattice lines between cells.
    let vertex_plan = grid
        .plan_path(
            &[0, 0],
            &[6, 6],
            &PlanOptions {
                mode: GridMode::Vertex,
                ..PlanOptions::default()
            },
        )
        .unwrap();
    println!(
        "vertex plan complete={} length={}",
        vertex_plan.complete,
        vertex_plan.path.len()
    );
}
