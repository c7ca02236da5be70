/*!

This is the long-form manual for `supervisor_allocation` and `supalloc`.

## Input format

The input is a table with a header row. The first four columns are, in this order:
the roll number, the name, the email and the academic score (CGPA) of the student.
Every following column is a supervisor: the header holds the name of the supervisor
and each cell holds the rank that the student gives to this supervisor (1 is the most
preferred).

| Roll     | Name  | Email             | CGPA | F1 | F2 | F3 |
|----------|-------|-------------------|------|----|----|----|
| 2301CS01 | Asha  | asha@example.com  | 9.1  | 2  | 1  | 3  |
| 2301CS02 | Bilal | bilal@example.com | 8.7  | 1  | 3  | 2  |

The following formats are supported by `supalloc`:
* `csv` Comma Separated Values, with the header in the first line
* `xlsx` Excel spreadsheets. The first worksheet is used unless `--excel-worksheet-name` is given.

Ranks can be written as integers (`2`) or as integral decimal numbers (`2.0`), which is what
most spreadsheet programs export.

## Validation

The following problems stop the allocation before it starts:
* no supervisor column
* two supervisor columns with the same name
* a rank that is not between 1 and the number of supervisors
* a student that gives the same rank to two supervisors. This check can be relaxed
  with the `useColumnOrder` mode, in which case supervisors with the same rank are
  tried in column order.
* a score that is not a finite number
* a header whose first four columns are not `Roll`, `Name`, `Email` and `CGPA`
  (case-insensitive). The supervisors start at the fifth column, so a missing column
  is never replaced by a supervisor.

The error message names the row (starting at 1 for the first student) and the column.

## Algorithm

1. Every supervisor can take `N / M` students (N students, M supervisors). The first
   `N % M` supervisors, in column order, can take one more student.
2. The students are sorted by decreasing score. Students with the same score keep the
   order of the input.
3. The sorted students are cut into rounds of M students. At the start of a round,
   every supervisor that still has some capacity is available. Each student of the
   round, best score first, takes the most preferred supervisor that is still available
   in this round. A supervisor receives at most one student per round.
4. A student that finds no available supervisor stays unassigned. This is not an error.

The outcome only depends on the order of the rows and the values in the table: running
the same input twice gives the same allocation.

## Outputs

`supalloc` writes three tables to the output directory (`Output` by default):
* `faculty_preference_count.csv`: for every supervisor, how many students ranked it
  first, second, and so on
* `cgpa_wise_student_allocation.csv`: the input table, sorted by decreasing score, with
  an extra `Allocated` column
* `roll_wise_student_allocation.csv`: the roll, name, email, score and allocated
  supervisor, sorted by roll number. Rolls are compared by their letters first and then
  by the number made of their digits, so that `B12` comes before `B100`.

A summary in JSON format (`allocation_summary.json`) with the capacities and the
assignments of every round is also written unless disabled in the configuration.

## Configuration

All the options can be stored in a JSON configuration file passed with `--config`.
Options given on the command line take precedence.

```json
{
  "outputSettings": {
    "outputDirectory": "Output",
    "generateSummaryJson": true
  },
  "inputSource": {
    "provider": "csv",
    "filePath": "input_btp_mtp_allocation.csv"
  },
  "rules": {
    "duplicateRankMode": "reject"
  }
}
```

Paths in the configuration file are relative to the directory of the configuration file.

## Checking against a reference

`--reference <directory>` compares the generated tables with the tables of the same name
in the given directory. Any difference is printed and makes the run fail.

*/
