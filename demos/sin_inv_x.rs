use std::{error::Error,
          fs::File,
          io::Write};
use adaptive_plot::{expr, BoundingBox, Sampling, transform::Window};


type R = Result<(), Box<dyn Error>>;

fn main() -> R {
    let data = BoundingBox { xmin: -0.4, xmax: 0.4, ymin: -1., ymax: 1. };
    let w = Window::new(0., 0., 400., 300., data)?;
    let mut fh = File::create("/tmp/sin_inv_x.gp")?;
    write!(fh, "set terminal pngcairo\n\
                set yrange [*:*] reverse\n\
                set grid\n")?;
    let mut d = 0;
    let mut save = |s: &Sampling, title| -> R {
        d += 1;
        let fname = format!("/tmp/sin_inv_x{}.dat", d);
        write!(File::create(&fname)?, "{}", s)?;
        write!(fh, "set output \"sin_inv_x{}.png\"\n\
                    plot '{}' with l lt 1 lw 2 title \"{} ({} pts)\"\n",
               d, &fname, title, s.len())?;
        Ok(())
    };

    let f = |x: f64| x * (1. / x).sin();
    let s = Sampling::fun(f, -0.4, 0.4).build(&w)?;
    save(&s, "x sin(1/x)")?;
    let s = Sampling::fun(f, -0.4, 0.4).linearity_limit(0.01).build(&w)?;
    save(&s, "x sin(1/x), tolerance 0.01")?;

    let g = expr::function("sin(1 / x)")?;
    let s = Sampling::try_param(g, -0.4, 0.4).seed(0).build(&w)?;
    save(&s, "sin(1/x)")?;

    Ok(())
}
