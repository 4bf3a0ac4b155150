use std::error::Error;
use adaptive_plot::{BoundingBox, Sampling, TickPlanner,
                    draw::{Axis, AxisStyle, AxisTicks, Drawable},
                    transform::Window};

fn main() -> Result<(), Box<dyn Error>> {
    let data = BoundingBox { xmin: 1e-3, xmax: 1e4, ymin: -3., ymax: 4. };
    let w = Window::new(0., 0., 400., 300., data)?.log_x(10.)?;

    let planner = TickPlanner::new(data.xmin, data.xmax)?.log(10.)?;
    let axis = AxisTicks::planned(Axis::X { y: data.ymin }, &planner,
                                  AxisStyle::default())?;
    for l in axis.labels(&w) {
        println!("{:>8} at ({:.1}, {:.1})", l.text, l.anchor[0], l.anchor[1]);
    }
    let p = axis.to_path(&w);
    println!("axis: {} primitives", p.commands.len());

    let s = Sampling::fun(f64::log10, 1e-3, 1e4).build(&w)?;
    println!("log10: {} samples, device box {:?}", s.len(), s.bounding_box());
    Ok(())
}
